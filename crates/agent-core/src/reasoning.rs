//! Reasoning Loop
//!
//! Implements the ReAct (Reason + Act) pattern for agent behavior as an
//! explicit state machine:
//!
//! ```text
//!            ┌──────────────────────┐  tool calls  ┌────────────────────────┐
//!  input ──▶ │  AwaitingReasoning   │ ───────────▶ │  AwaitingToolResults   │
//!            └──────────────────────┘ ◀─────────── └────────────────────────┘
//!                       │ plain answer   observations
//!                       ▼
//!                  ┌──────────┐
//!                  │ Terminal │ ── persist new messages, emit answer
//!                  └──────────┘
//! ```
//!
//! A turn is exposed as a lazy [`Stream`] of [`AgentEvent`]s; [`Agent::run`]
//! simply drains it.

use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt, stream};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::actor::Actor;
use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message};
use crate::provider::{GenerationOptions, LlmProvider};
use crate::reasoner::Reasoner;
use crate::session::{MemoryThreadStore, ThreadId, ThreadStore};
use crate::tool::{Tool, ToolCall, ToolRegistry, ToolSchema};

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System prompt sent ahead of every model call
    pub system_prompt: String,

    /// Maximum reasoning steps per turn; `None` disables the cap
    pub max_iterations: Option<usize>,

    /// Generation options
    pub generation: GenerationOptions,

    /// Deadline for a whole turn
    pub turn_timeout: Option<Duration>,
}

pub const MAX_ITERATIONS_LIMIT: usize = 100;

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_iterations: Some(20),
            generation: GenerationOptions::default(),
            turn_timeout: None,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(max) = self.max_iterations {
            if !(1..=MAX_ITERATIONS_LIMIT).contains(&max) {
                return Err(AgentError::Config(format!(
                    "max_iterations {max} outside 1..={MAX_ITERATIONS_LIMIT}"
                )));
            }
        }
        if self.turn_timeout == Some(Duration::ZERO) {
            return Err(AgentError::Config("turn_timeout must be positive".into()));
        }
        self.generation.validate()
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant. \
Use the available tools when they help answer the question, \
then synthesize their results into a concise, accurate answer.";

/// Step of a turn, in emission order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// The model asked for a tool
    ToolRequested {
        id: String,
        name: String,
        arguments: Map<String, Value>,
    },
    /// A tool call finished (successfully or not)
    ToolCompleted {
        id: String,
        name: String,
        success: bool,
        output: String,
    },
    /// Final answer; always the last event of a successful turn
    Answer { content: String },
}

impl fmt::Display for AgentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToolRequested { name, .. } => write!(f, "{name}: ..."),
            Self::ToolCompleted { name, output, .. } => write!(f, "{name}: {output}"),
            Self::Answer { content } => write!(f, "{content}"),
        }
    }
}

/// Lazy, finite, single-use sequence of turn events
pub type AgentStream<'a> = Pin<Box<dyn Stream<Item = Result<AgentEvent>> + Send + 'a>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoopState {
    AwaitingReasoning,
    AwaitingToolResults,
    Terminal,
}

/// The main Agent struct
pub struct Agent {
    reasoner: Reasoner,
    actor: Actor,
    store: Arc<dyn ThreadStore>,
    schemas: Vec<ToolSchema>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        store: Arc<dyn ThreadStore>,
        config: AgentConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reasoner: Reasoner::new(provider, config.generation.clone(), config.system_prompt.clone()),
            schemas: tools.schemas(),
            actor: Actor::new(tools),
            store,
            config,
        })
    }

    /// Run one turn on `thread` and return the final answer
    pub async fn run(&self, thread: &ThreadId, input: &str) -> Result<String> {
        self.run_with_cancel(thread, input, CancellationToken::new()).await
    }

    /// Like [`Agent::run`], abandoning the turn once `cancel` fires
    pub async fn run_with_cancel(
        &self,
        thread: &ThreadId,
        input: &str,
        cancel: CancellationToken,
    ) -> Result<String> {
        let mut events = self.stream(thread.clone(), input, cancel);
        let mut answer = None;
        while let Some(event) = events.next().await {
            if let AgentEvent::Answer { content } = event? {
                answer = Some(content);
            }
        }
        answer.ok_or_else(|| AgentError::ModelUnavailable("turn ended without an answer".into()))
    }

    /// Run with a single question on a fresh thread
    pub async fn ask(&self, question: &str) -> Result<String> {
        self.run(&ThreadId::generate(), question).await
    }

    /// Start a turn and expose its steps as a stream.
    ///
    /// Nothing is persisted unless the stream reaches its final
    /// [`AgentEvent::Answer`]; an `Err` item ends the stream.
    pub fn stream(
        &self,
        thread: ThreadId,
        input: impl Into<String>,
        cancel: CancellationToken,
    ) -> AgentStream<'_> {
        let turn = match Turn::start(self, thread, input.into(), cancel) {
            Ok(turn) => turn,
            Err(e) => return Box::pin(stream::once(async move { Err(e) })),
        };

        Box::pin(stream::unfold(Some(turn), |turn| async move {
            let mut turn = turn?;
            match turn.advance().await {
                Ok(Some(event)) => Some((Ok(event), Some(turn))),
                Ok(None) => None,
                Err(e) => {
                    tracing::warn!(thread = %turn.thread, error = %e, "Turn aborted");
                    Some((Err(e), None))
                }
            }
        }))
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        self.actor.tools()
    }

    /// Get the thread store
    pub fn store(&self) -> &Arc<dyn ThreadStore> {
        &self.store
    }

    /// Get the model provider
    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        self.reasoner.provider()
    }

    /// Get configuration
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// State of one in-flight turn
struct Turn<'a> {
    agent: &'a Agent,
    thread: ThreadId,
    conversation: Conversation,
    persisted: usize,
    state: LoopState,
    pending: Vec<ToolCall>,
    iterations: usize,
    events: VecDeque<AgentEvent>,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl<'a> Turn<'a> {
    fn start(
        agent: &'a Agent,
        thread: ThreadId,
        input: String,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let history = agent.store.load(&thread)?;
        let persisted = history.len();
        let mut conversation = Conversation::from_messages(history);
        conversation.push(Message::user(input));

        tracing::debug!(thread = %thread, prior = persisted, "Starting turn");

        Ok(Self {
            agent,
            thread,
            conversation,
            persisted,
            state: LoopState::AwaitingReasoning,
            pending: Vec::new(),
            iterations: 0,
            events: VecDeque::new(),
            cancel: cancel.child_token(),
            deadline: agent.config.turn_timeout.map(|t| Instant::now() + t),
        })
    }

    /// Drive the state machine until the next event is available
    async fn advance(&mut self) -> Result<Option<AgentEvent>> {
        loop {
            if let Some(event) = self.events.pop_front() {
                return Ok(Some(event));
            }
            match self.state {
                LoopState::AwaitingReasoning => self.reason().await?,
                LoopState::AwaitingToolResults => self.act().await?,
                LoopState::Terminal => return Ok(None),
            }
        }
    }

    async fn reason(&mut self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(AgentError::Cancelled);
        }

        self.iterations += 1;
        if let Some(max) = self.agent.config.max_iterations {
            if self.iterations > max {
                return Err(AgentError::LoopExceeded(max));
            }
        }

        let decision = self
            .agent
            .reasoner
            .decide(self.conversation.messages(), &self.agent.schemas);
        let message = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(AgentError::Cancelled),
            () = expired(self.deadline) => return Err(AgentError::Cancelled),
            message = decision => message?,
        };

        if message.is_final_answer() {
            let content = message.content.clone();
            self.conversation.push(message);
            self.persist()?;
            tracing::info!(
                thread = %self.thread,
                iterations = self.iterations,
                "Turn completed"
            );
            self.events.push_back(AgentEvent::Answer { content });
            self.state = LoopState::Terminal;
        } else {
            for call in &message.tool_calls {
                self.events.push_back(AgentEvent::ToolRequested {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                });
            }
            self.pending.clone_from(&message.tool_calls);
            self.conversation.push(message);
            self.state = LoopState::AwaitingToolResults;
        }
        Ok(())
    }

    async fn act(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);

        let results = {
            let batch = self.agent.actor.execute(&pending, &self.cancel);
            tokio::pin!(batch);
            tokio::select! {
                results = &mut batch => results,
                () = expired(self.deadline) => {
                    self.cancel.cancel();
                    batch.await
                }
            }
        };

        if self.cancel.is_cancelled() {
            return Err(AgentError::Cancelled);
        }

        for result in results {
            let output = result.observation();
            self.events.push_back(AgentEvent::ToolCompleted {
                id: result.tool_call_id.clone(),
                name: result.name.clone(),
                success: result.is_success(),
                output: output.clone(),
            });
            self.conversation.push(Message::tool(output, result.tool_call_id));
        }

        debug_assert!(self.conversation.check_tool_round_trip(false).is_ok());
        self.state = LoopState::AwaitingReasoning;
        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        let new_messages = self.conversation.tail(self.persisted).to_vec();
        self.agent.store.append(&self.thread, new_messages)?;
        self.persisted = self.conversation.len();
        Ok(())
    }
}

async fn expired(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    store: Option<Arc<dyn ThreadStore>>,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            store: None,
            config: AgentConfig::default(),
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Result<Self> {
        self.tools.register(tool)?;
        Ok(self)
    }

    #[must_use]
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn store(mut self, store: Arc<dyn ThreadStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    #[must_use]
    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    #[must_use]
    pub fn max_iterations(mut self, max: Option<usize>) -> Self {
        self.config.max_iterations = max;
        self
    }

    #[must_use]
    pub fn turn_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.turn_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryThreadStore::new()));

        Agent::new(provider, Arc::new(self.tools), store, self.config)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use async_trait::async_trait;

    use super::*;
    use crate::error::ToolError;
    use crate::message::Role;
    use crate::provider::Completion;
    use crate::testing::{FakeTool, ScriptedProvider, Step, echo_query, query_call};

    fn agent_with(provider: Arc<dyn LlmProvider>, tools: Vec<FakeTool>) -> Agent {
        let mut builder = AgentBuilder::new().provider(provider);
        for tool in tools {
            builder = builder.tool(tool).unwrap();
        }
        builder.build().unwrap()
    }

    fn thread(id: &str) -> ThreadId {
        ThreadId::from_string(id)
    }

    #[tokio::test]
    async fn one_search_then_answer() {
        let provider = Arc::new(ScriptedProvider::new([
            Step::Reply(Message::assistant_with_tools(
                "",
                vec![query_call("c1", "search_legifrance", "congés payés")],
            )),
            Step::Reply(Message::assistant("Article L3141-1 du Code du travail.")),
        ]));
        let search = FakeTool::new("search_legifrance", echo_query);
        let tool_calls = search.calls.clone();
        let agent = agent_with(provider.clone(), vec![search]);

        let answer = agent.run(&thread("t"), "Combien de congés payés ?").await.unwrap();

        assert_eq!(answer, "Article L3141-1 du Code du travail.");
        assert_eq!(provider.call_count(), 2);
        assert_eq!(tool_calls.load(Ordering::SeqCst), 1);

        let history = agent.store().load(&thread("t")).unwrap();
        let roles: Vec<Role> = history.iter().map(|m| m.role).collect();
        assert_eq!(roles, [Role::User, Role::Assistant, Role::Tool, Role::Assistant]);
        assert_eq!(history[2].content, "résultats pour congés payés");
        assert!(Conversation::from_messages(history).check_tool_round_trip(false).is_ok());
    }

    #[tokio::test]
    async fn every_call_gets_an_observation_even_on_failure() {
        let provider = Arc::new(ScriptedProvider::new([
            Step::Reply(Message::assistant_with_tools(
                "Je cherche.",
                vec![
                    query_call("a", "search_legifrance", "bail"),
                    query_call("b", "broken", "bail"),
                    query_call("c", "nope", "bail"),
                ],
            )),
            Step::Reply(Message::assistant("Fini")),
        ]));
        let agent = agent_with(
            provider.clone(),
            vec![
                FakeTool::new("search_legifrance", echo_query),
                FakeTool::new("broken", |_| Err(ToolError::Remote("500 interne".into()))),
            ],
        );

        agent.run(&thread("t"), "question").await.unwrap();

        let seen = provider.seen.lock().unwrap();
        let second = &seen[1];
        let observations: Vec<_> = second.iter().filter(|m| m.role == Role::Tool).collect();
        assert_eq!(observations.len(), 3);
        let ids: Vec<_> = observations.iter().filter_map(|m| m.tool_call_id.as_deref()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert!(observations[1].content.contains("500 interne"));
    }

    #[tokio::test]
    async fn invalid_arguments_become_observation_without_dispatch() {
        let mut arguments = Map::new();
        arguments.insert("query".into(), Value::from("congés payés"));
        arguments.insert("max_results".into(), Value::from("ten"));
        let provider = Arc::new(ScriptedProvider::new([
            Step::Reply(Message::assistant_with_tools(
                "",
                vec![ToolCall::new("x", "search_legifrance", arguments)],
            )),
            Step::Reply(Message::assistant("Désolé")),
        ]));
        let search = FakeTool::new("search_legifrance", echo_query);
        let dispatched = search.calls.clone();
        let agent = agent_with(provider, vec![search]);

        let mut events = agent.stream(thread("t"), "q", CancellationToken::new());
        let mut completed = Vec::new();
        while let Some(event) = events.next().await {
            if let AgentEvent::ToolCompleted { success, output, .. } = event.unwrap() {
                completed.push((success, output));
            }
        }

        assert_eq!(dispatched.load(Ordering::SeqCst), 0);
        assert_eq!(completed.len(), 1);
        assert!(!completed[0].0);
        assert!(completed[0].1.contains("Invalid arguments"));
    }

    #[tokio::test]
    async fn unavailable_tool_does_not_stop_the_loop() {
        let provider = Arc::new(ScriptedProvider::new([
            Step::Reply(Message::assistant_with_tools(
                "",
                vec![query_call("1", "search_legifrance", "x")],
            )),
            Step::Reply(Message::assistant("Le service est indisponible.")),
        ]));
        let agent = agent_with(
            provider.clone(),
            vec![FakeTool::new("search_legifrance", |_| {
                Err(ToolError::Unavailable("timed out".into()))
            })],
        );

        let answer = agent.run(&thread("t"), "q").await.unwrap();

        assert_eq!(answer, "Le service est indisponible.");
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn events_arrive_in_order() {
        let provider = Arc::new(ScriptedProvider::new([
            Step::Reply(Message::assistant_with_tools(
                "",
                vec![query_call("1", "search_legifrance", "bail")],
            )),
            Step::Reply(Message::assistant("ok")),
        ]));
        let agent = agent_with(provider, vec![FakeTool::new("search_legifrance", echo_query)]);

        let events: Vec<AgentEvent> = agent
            .stream(thread("t"), "q", CancellationToken::new())
            .map(|e| e.unwrap())
            .collect()
            .await;

        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], AgentEvent::ToolRequested { name, .. } if name == "search_legifrance"));
        assert_eq!(events[1].to_string(), "search_legifrance: résultats pour bail");
        assert_eq!(events[2], AgentEvent::Answer { content: "ok".into() });
    }

    #[tokio::test]
    async fn loop_cap_stops_a_stubborn_model() {
        let provider = Arc::new(ScriptedProvider::new([Step::Repeat(query_call(
            "r",
            "search_legifrance",
            "encore",
        ))]));
        let search = FakeTool::new("search_legifrance", echo_query);
        let batches = search.calls.clone();
        let agent = AgentBuilder::new()
            .provider(provider.clone())
            .tool(search)
            .unwrap()
            .max_iterations(Some(5))
            .build()
            .unwrap();

        let err = agent.run(&thread("t"), "q").await.unwrap_err();

        assert!(matches!(err, AgentError::LoopExceeded(5)));
        assert_eq!(provider.call_count(), 5);
        assert_eq!(batches.load(Ordering::SeqCst), 5);
        assert!(agent.store().load(&thread("t")).unwrap().is_empty());
    }

    #[tokio::test]
    async fn model_failure_aborts_and_persists_nothing() {
        let provider = Arc::new(ScriptedProvider::new([Step::Fail("connection refused".into())]));
        let agent = agent_with(provider, vec![]);

        let err = agent.run(&thread("t"), "q").await.unwrap_err();

        assert!(matches!(err, AgentError::ModelUnavailable(_)));
        assert!(agent.store().load(&thread("t")).unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_turn_sees_first_turn() {
        let provider = Arc::new(ScriptedProvider::new([
            Step::Reply(Message::assistant("Bonjour !")),
            Step::Reply(Message::assistant("Toujours là.")),
        ]));
        let agent = agent_with(provider.clone(), vec![]);

        agent.run(&thread("t"), "Salut").await.unwrap();
        agent.run(&thread("t"), "Tu es là ?").await.unwrap();

        let seen = provider.seen.lock().unwrap();
        let contents: Vec<_> = seen[1].iter().skip(1).map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["Salut", "Bonjour !", "Tu es là ?"]);
        assert_eq!(agent.store().load(&thread("t")).unwrap().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_abandons_slow_tools() {
        let provider = Arc::new(ScriptedProvider::new([Step::Reply(
            Message::assistant_with_tools("", vec![query_call("1", "slow", "x")]),
        )]));
        let agent = agent_with(
            provider,
            vec![FakeTool::new("slow", echo_query).with_delay(Duration::from_secs(3600))],
        );

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let err = agent.run_with_cancel(&thread("t"), "q", cancel).await.unwrap_err();

        assert!(matches!(err, AgentError::Cancelled));
        assert!(agent.store().load(&thread("t")).unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn turn_timeout_interrupts_model_call() {
        let provider = Arc::new(
            ScriptedProvider::new([Step::Reply(Message::assistant("trop tard"))])
                .with_delay(Duration::from_secs(60)),
        );
        let agent = AgentBuilder::new()
            .provider(provider)
            .turn_timeout(Some(Duration::from_secs(5)))
            .build()
            .unwrap();

        let err = agent.run(&thread("t"), "q").await.unwrap_err();
        assert!(matches!(err, AgentError::Cancelled));
    }

    #[test]
    fn builder_requires_provider_and_valid_cap() {
        assert!(matches!(AgentBuilder::new().build(), Err(AgentError::Config(_))));

        let provider = Arc::new(ScriptedProvider::default());
        let err = AgentBuilder::new()
            .provider(provider)
            .max_iterations(Some(0))
            .build();
        assert!(matches!(err, Err(AgentError::Config(_))));
    }

    /// Deterministic provider: searches for the user's text, then answers
    /// with the observation. Safe to share between concurrent threads.
    struct MirrorProvider;

    #[async_trait]
    impl LlmProvider for MirrorProvider {
        fn name(&self) -> &str {
            "mirror"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        async fn complete(
            &self,
            messages: &[Message],
            _tools: &[ToolSchema],
            options: &GenerationOptions,
        ) -> Result<Completion> {
            tokio::task::yield_now().await;
            let last = messages.last().expect("history is never empty");
            let message = match last.role {
                Role::User => Message::assistant_with_tools(
                    "",
                    vec![query_call(&format!("id-{}", last.content), "search_legifrance", &last.content)],
                ),
                _ => Message::assistant(format!("Réponse: {}", last.content)),
            };
            Ok(Completion {
                message,
                model: options.model.clone(),
                usage: None,
                finish_reason: None,
            })
        }
    }

    fn transcript(agent: &Agent, id: &str) -> Vec<(Role, String)> {
        agent
            .store()
            .load(&thread(id))
            .unwrap()
            .into_iter()
            .map(|m| (m.role, m.content))
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_threads_do_not_interleave() {
        let concurrent = agent_with(
            Arc::new(MirrorProvider),
            vec![FakeTool::new("search_legifrance", echo_query)],
        );
        let (x, y) = (thread("x"), thread("y"));
        let (a, b) = tokio::join!(
            concurrent.run(&x, "bail commercial"),
            concurrent.run(&y, "congés payés"),
        );
        a.unwrap();
        b.unwrap();

        let sequential = agent_with(
            Arc::new(MirrorProvider),
            vec![FakeTool::new("search_legifrance", echo_query)],
        );
        sequential.run(&thread("y"), "congés payés").await.unwrap();
        sequential.run(&thread("x"), "bail commercial").await.unwrap();

        assert_eq!(transcript(&concurrent, "x"), transcript(&sequential, "x"));
        assert_eq!(transcript(&concurrent, "y"), transcript(&sequential, "y"));
        assert_eq!(transcript(&concurrent, "x").len(), 4);
    }
}
