use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use orca_config::EngineConfig;
use orca_core::{
    ContextAssembler, LlmClient, LlmRequest, LlmResponse, MemoryStore, Observation, OrcaError,
    Plan, PlanInput, Planner, Policy, Request, Response, Result, Role, ToolCall, ToolDef,
    ToolExecutor, ToolRegistry, Trace,
};

use crate::validate::validate_call;

pub const DEFAULT_MAX_STEPS: usize = 4;
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(20);

const POLICY_BLOCKED: &str = "tool blocked by policy";

/// Await `fut` unless `cancel` fires first.
async fn guard<F: Future>(cancel: &CancellationToken, fut: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(OrcaError::Cancelled),
        out = fut => Ok(out),
    }
}

/// The orchestration engine.
///
/// Holds only shared, stateless collaborators: one `Engine` behind an `Arc`
/// serves any number of concurrent runs. All per-run state lives on the
/// stack of [`Engine::run_with_cancel`].
pub struct Engine {
    planner: Arc<dyn Planner>,
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolRegistry>,
    executor: Arc<dyn ToolExecutor>,
    context: Arc<dyn ContextAssembler>,
    memory: Option<Arc<dyn MemoryStore>>,
    policy: Option<Arc<dyn Policy>>,
    max_steps: usize,
    tool_timeout: Duration,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn tool_timeout(&self) -> Duration {
        self.tool_timeout
    }

    /// Run a request to completion.
    pub async fn run(&self, request: Request) -> Result<Response> {
        self.run_with_cancel(request, CancellationToken::new()).await
    }

    /// Run a request, aborting with [`OrcaError::Cancelled`] as soon as
    /// `cancel` fires at any suspension point.
    pub async fn run_with_cancel(
        &self,
        request: Request,
        cancel: CancellationToken,
    ) -> Result<Response> {
        if request.query.trim().is_empty() {
            return Err(OrcaError::InvalidRequest("query is required".into()));
        }

        let mut trace = Trace::generate();
        trace.add_event(
            "run.start",
            format!(
                "session={} user={} project={}",
                request.session_id, request.user_id, request.project_id
            ),
        );
        info!(trace_id = %trace.id, session = %request.session_id, "run started");

        let mut tool_note = None;
        let tools = match guard(
            &cancel,
            self.tools.list_tools(&request.user_id, &request.project_id),
        )
        .await?
        {
            Ok(tools) => {
                trace.add_event("tools.list", format!("{} tools", tools.len()));
                tools
            }
            Err(e) => {
                warn!(error = %e, "tool discovery failed, continuing without tools");
                trace.add_event("tools.list.failed", e.to_string());
                tool_note = Some(format!("Tool discovery failed; proceeding without tools: {e}"));
                Vec::new()
            }
        };

        let mut prompt = guard(&cancel, self.context.build(&request, &tools)).await??;
        if let Some(note) = tool_note {
            prompt.push_str("\n\n## System Notes\n");
            prompt.push_str(&note);
        }

        let mut observations: Vec<Observation> = Vec::new();
        let mut folded = 0;

        for step in 1..=self.max_steps {
            let input = PlanInput {
                request: request.clone(),
                prompt: prompt.clone(),
                tools: tools.clone(),
                observations: observations.clone(),
                step,
            };
            let plan = guard(&cancel, self.planner.plan(&input)).await??;
            trace.add_event("plan", format!("step={step} kind={}", plan.kind()));
            debug!(step, kind = plan.kind(), "planner decided");

            let calls = match plan {
                Plan::Direct => {
                    let llm_request = LlmRequest {
                        query: request.query.clone(),
                        prompt,
                        observations: observations.clone(),
                        history: request.history.clone(),
                        provider: request.provider.clone(),
                        model: request.model.clone(),
                    };
                    let reply = guard(&cancel, self.llm.respond(&llm_request)).await??;
                    trace.add_event(
                        "llm.respond",
                        format!("provider={} model={}", reply.provider, reply.model),
                    );
                    return Ok(self.finalize(&request, reply, observations, trace).await);
                }
                Plan::NeedClarification { question } => {
                    return Ok(self
                        .finalize(&request, LlmResponse::text(question), observations, trace)
                        .await);
                }
                Plan::ToolCalls { calls } => calls,
            };

            if calls.is_empty() {
                return Err(OrcaError::EmptyToolPlan);
            }
            for call in &calls {
                let observation = self.dispatch(call, &tools, &cancel, &mut trace).await?;
                observations.push(observation);
            }

            prompt = guard(
                &cancel,
                self.context
                    .append_observations(&prompt, &observations[folded..]),
            )
            .await??;
            folded = observations.len();
        }

        warn!(max_steps = self.max_steps, trace_id = %trace.id, "run did not converge");
        Err(OrcaError::DidNotConverge {
            max_steps: self.max_steps,
        })
    }

    /// Validate, policy-check, and execute one call. Every outcome except
    /// cancellation becomes an observation.
    async fn dispatch(
        &self,
        call: &ToolCall,
        tools: &[ToolDef],
        cancel: &CancellationToken,
        trace: &mut Trace,
    ) -> Result<Observation> {
        if let Err(reason) = validate_call(call, tools) {
            debug!(tool = %call.name, reason = %reason, "tool call rejected");
            trace.add_event("tool.rejected", format!("{}: {reason}", call.name));
            return Ok(Observation::failure(&call.name, reason));
        }

        if let Some(ref policy) = self.policy {
            if !policy.allow_tool(&call.name) {
                info!(tool = %call.name, "tool call blocked by policy");
                trace.add_event("tool.blocked", call.name.clone());
                return Ok(Observation::failure(&call.name, POLICY_BLOCKED));
            }
        }

        trace.add_event("tool.call", format!("{}.{}", call.name, call.action));
        let outcome = guard(
            cancel,
            tokio::time::timeout(self.tool_timeout, self.executor.execute(call)),
        )
        .await?;

        let error = match outcome {
            Ok(Ok(result)) => {
                trace.add_event(
                    "tool.result",
                    format!("{} success={}", call.name, result.success),
                );
                return Ok(Observation::success(&call.name, result));
            }
            Ok(Err(e)) => e,
            Err(_) => OrcaError::ToolTimeout {
                tool: call.name.clone(),
                millis: self.tool_timeout.as_millis(),
            },
        };
        warn!(tool = %call.name, action = %call.action, error = %error, "tool call failed");
        trace.add_event("tool.error", error.to_string());
        Ok(Observation::failure(&call.name, error.to_string()))
    }

    /// Record memory and build the response. Memory failures are logged and
    /// never change what is returned.
    async fn finalize(
        &self,
        request: &Request,
        reply: LlmResponse,
        observations: Vec<Observation>,
        mut trace: Trace,
    ) -> Response {
        if let Some(ref memory) = self.memory {
            let session = request.session_id.as_str();
            let mut failures = Vec::new();

            if let Err(e) = memory
                .add_turn(session, Role::User, &request.query, Utc::now())
                .await
            {
                failures.push(format!("user turn: {e}"));
            }
            if let Err(e) = memory
                .add_turn(session, Role::Assistant, &reply.text, Utc::now())
                .await
            {
                failures.push(format!("assistant turn: {e}"));
            }
            for obs in observations.iter().filter(|o| o.result().is_some()) {
                if let Err(e) = memory.store_fact(session, obs).await {
                    failures.push(format!("fact {}: {e}", obs.tool_name));
                }
            }

            for failure in failures {
                warn!(session = %session, error = %failure, "memory write failed");
                trace.add_event("memory.failed", failure);
            }
        }

        trace.add_event("run.finish", format!("observations={}", observations.len()));
        info!(
            trace_id = %trace.id,
            observations = observations.len(),
            provider = %reply.provider,
            "run finished"
        );

        Response {
            text: reply.text,
            provider: reply.provider,
            model: reply.model,
            observations,
            trace,
        }
    }
}

/// Assembles an [`Engine`]. Planner, LLM client, tool registry, tool
/// executor, and context assembler are required.
#[derive(Default)]
pub struct EngineBuilder {
    planner: Option<Arc<dyn Planner>>,
    llm: Option<Arc<dyn LlmClient>>,
    tools: Option<Arc<dyn ToolRegistry>>,
    executor: Option<Arc<dyn ToolExecutor>>,
    context: Option<Arc<dyn ContextAssembler>>,
    memory: Option<Arc<dyn MemoryStore>>,
    policy: Option<Arc<dyn Policy>>,
    max_steps: Option<usize>,
    tool_timeout: Option<Duration>,
}

impl EngineBuilder {
    pub fn planner(mut self, planner: Arc<dyn Planner>) -> Self {
        self.planner = Some(planner);
        self
    }

    pub fn llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn tools(mut self, tools: Arc<dyn ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn executor(mut self, executor: Arc<dyn ToolExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn context(mut self, context: Arc<dyn ContextAssembler>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn memory(mut self, memory: Arc<dyn MemoryStore>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn policy(mut self, policy: Arc<dyn Policy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Zero falls back to [`DEFAULT_MAX_STEPS`].
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Zero falls back to [`DEFAULT_TOOL_TIMEOUT`].
    pub fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = Some(timeout);
        self
    }

    pub fn config(self, config: &EngineConfig) -> Self {
        self.max_steps(config.max_steps)
            .tool_timeout(Duration::from_secs(config.tool_timeout_secs))
    }

    pub fn build(self) -> Result<Engine> {
        fn required<T>(value: Option<T>, name: &str) -> Result<T> {
            value.ok_or_else(|| OrcaError::Config(format!("{name} is required")))
        }

        Ok(Engine {
            planner: required(self.planner, "planner")?,
            llm: required(self.llm, "llm client")?,
            tools: required(self.tools, "tool registry")?,
            executor: required(self.executor, "tool executor")?,
            context: required(self.context, "context assembler")?,
            memory: self.memory,
            policy: self.policy,
            max_steps: self
                .max_steps
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_MAX_STEPS),
            tool_timeout: self
                .tool_timeout
                .filter(|d| !d.is_zero())
                .unwrap_or(DEFAULT_TOOL_TIMEOUT),
        })
    }
}
