//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::env;
use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::client::DEFAULT_ENDPOINT;

/// Environment variable consulted when no endpoint is given on the command line.
pub const ENDPOINT_ENV_VAR: &str = "RELAYCHAT_ENDPOINT";

/// Greeting shown when a session opens.
pub const DEFAULT_GREETING: &str = "👋 Hello! How can I help you with your L'Oréal needs today?";

/// Text of the transient indicator shown while a reply is awaited.
pub const DEFAULT_PENDING_TEXT: &str = "...";

/// Instructions sent as the system message of every transcript.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"Act as a knowledgeable L'Oreal employee dedicated to assisting clients with their beauty-related questions, offering expert, helpful, and accurate guidance on hair products, skin care, and makeup products. Ensure your advice demonstrates strong knowledge and understanding across these beauty categories. Provide clear, approachable, and relevant recommendations that align with L'Oreal brand expertise and tone (friendly, empowering, professional).
- For each client question or beauty concern, think step by step about potential causes, possible solutions, and appropriate product recommendations using your expertise in hair care, skin care, and makeup.
- Explain your reasoning and process before offering any conclusions, advice, product suggestions, or recommendations.
- Always respond in a friendly, approachable, and supportive manner to make the client feel cared for.
- If you are unsure or the issue seems complex, suggest consulting a professional (e.g., dermatologist, cosmetologist) or refer to official L'Oreal resources.
- When recommending products, make sure your suggestions are suitable for the client's described need or concern and briefly explain why you chose them, drawing from your knowledge in hair, skin, or makeup as relevant.
-If a user asks a question unrelated to L'Oréal (e.g., other brands, general knowledge, personal opinions, or any other topic), you must politely decline.
# Output Format
Respond with a brief paragraph (3–5 sentences), structured as follows:
1. Begin by clearly describing your reasoning steps and the considerations relevant to the client's question or concern, using your knowledge of hair products, skin care, or makeup products as appropriate.
2. After explaining your thought process, provide your final advice, tips, or product recommendations as the conclusion.
# Examples
**Example 1:** Client Input: "My hair gets really frizzy in humid weather. What can I do to help prevent this?"
Reasoning: Frizz often occurs when hair lacks moisture and tries to absorb humidity from the air. Using nourishing hair products can help create a barrier against humidity and smooth the hair cuticle.
Conclusion: I recommend trying a leave-in conditioner or anti-frizz serum, such as L'Oreal's [Product Name], which helps lock in moisture and protect against humidity. Applying it to damp hair before styling can make a noticeable difference.
---
**Example 2:** Client Input: "I have sensitive skin that gets red easily. What kind of foundation should I use?"
Reasoning: Sensitive skin benefits from lightweight, fragrance-free foundations with soothing ingredients. Avoiding harsh chemicals can also prevent irritation.
Conclusion: I suggest trying a gentle foundation like L'Oreal True Match with added skincare ingredients. It offers coverage while being formulated to minimize redness and irritation for sensitive skin.
---
**Example 3:** Client Input: "My mascara always smudges by midday. Is there a way to make it last longer?"
Reasoning: Mascara smudging can be caused by oily eyelids, humidity, or using non-waterproof formulas. Prepping the eye area and choosing the right product can help improve wear time.
Conclusion: I recommend starting with an oil-free eye primer to help absorb excess oils, then using a waterproof mascara such as L'Oreal's [Mascara Product Name] for long-lasting wear. This combination can help prevent midday smudging and keep your lashes looking fresh.
# Important Instructions and Objective Reminder
Always explain your reasoning steps before giving advice or recommendations, drawing explicitly from knowledge in hair care, skin care, or makeup products as appropriate. Maintain the friendly, supportive, and expert tone of a L'Oreal employee. Respond in a short, helpful paragraph as outlined in the output format.
Remembers details from earlier messages and responds with context awareness.
When responding to the user, make sure to respond in a humanely fashion and down to earth, no weird symbols such as asterisks, or anything else. Refuses unrelated questions and only answers queries about L’Oréal products and routines
"#;

/// Command-line arguments for the relaychat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Responder endpoint URL.
    #[arrrg(optional, "Responder endpoint (default: $RELAYCHAT_ENDPOINT or built-in)", "URL")]
    pub endpoint: Option<String>,

    /// System prompt that opens the transcript.
    #[arrrg(optional, "System prompt for the conversation", "PROMPT")]
    pub system: Option<String>,

    /// Greeting shown at startup.
    #[arrrg(optional, "Greeting shown when the session opens", "TEXT")]
    pub greeting: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: none)", "SECONDS")]
    pub timeout: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Log diagnostics to stderr.
    #[arrrg(flag, "Log requests, responses, and failures to stderr")]
    pub verbose: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// The responder endpoint URL.
    pub endpoint: String,

    /// Fixed instructions carried by the system message.
    pub system_prompt: String,

    /// Greeting shown when the session opens; `None` shows nothing.
    pub greeting: Option<String>,

    /// Text of the pending indicator.
    pub pending_text: String,

    /// Optional request timeout.
    pub timeout: Option<Duration>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Whether to log diagnostics to stderr.
    pub verbose: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Endpoint: the built-in responder
    /// - System prompt: the beauty advisor instructions
    /// - Timeout: none
    /// - Color: enabled
    /// - Verbose: disabled
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            greeting: Some(DEFAULT_GREETING.to_string()),
            pending_text: DEFAULT_PENDING_TEXT.to_string(),
            timeout: None,
            use_color: true,
            verbose: false,
        }
    }

    /// Sets the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Sets or clears the greeting.
    pub fn with_greeting(mut self, greeting: Option<String>) -> Self {
        self.greeting = greeting;
        self
    }

    /// Sets the pending indicator text.
    pub fn with_pending_text(mut self, text: impl Into<String>) -> Self {
        self.pending_text = text.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets whether diagnostics are logged.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Resolve arguments against an explicit environment value.
    ///
    /// Precedence for the endpoint is argument, then `env_endpoint`, then the
    /// built-in default.  Empty values are ignored.
    pub fn from_args_and_env(args: ChatArgs, env_endpoint: Option<String>) -> Self {
        let endpoint = args
            .endpoint
            .filter(|s| !s.trim().is_empty())
            .or(env_endpoint.filter(|s| !s.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let greeting = match args.greeting {
            Some(greeting) if greeting.is_empty() => None,
            Some(greeting) => Some(greeting),
            None => Some(DEFAULT_GREETING.to_string()),
        };

        ChatConfig {
            endpoint,
            system_prompt: args
                .system
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            greeting,
            timeout: args.timeout.map(Duration::from_secs),
            use_color: !args.no_color,
            verbose: args.verbose,
            ..ChatConfig::new()
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        Self::from_args_and_env(args, env::var(ENDPOINT_ENV_VAR).ok())
    }
}
