//! Interactive mode for the server.
//!
//! Asks for the listen address and, when no key is configured, the Gemini
//! API key, then starts the server with those settings.

use dialoguer::{Confirm, Input, Password};
use urbis_ai::providers::API_KEY_VARS;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

/// Answers collected before the server starts.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ServerSettings {
    bind_addr: String,
    port: u16,
    /// Key entered at the prompt. `None` keeps whatever the environment has.
    api_key: Option<String>,
}

impl ServerSettings {
    /// Environment variables read by [`super::run_server`] and the AI
    /// provider.
    fn env_vars(&self) -> Vec<(&'static str, String)> {
        let mut vars = vec![
            ("BIND_ADDR", self.bind_addr.clone()),
            ("PORT", self.port.to_string()),
        ];
        if let Some(key) = &self.api_key {
            vars.push((API_KEY_VARS[0], key.clone()));
        }
        vars
    }
}

/// Whether any of the API key variables holds a non-blank value.
fn has_api_key(lookup: impl Fn(&str) -> Option<String>) -> bool {
    API_KEY_VARS
        .iter()
        .any(|var| lookup(var).is_some_and(|v| !v.trim().is_empty()))
}

/// Prompts with a default, falling back to it if the prompt fails.
fn prompt_or<T>(prompt: &str, default: T) -> T
where
    T: Clone + ToString + std::str::FromStr,
    <T as std::str::FromStr>::Err: ToString,
{
    Input::new()
        .with_prompt(prompt)
        .default(default.clone())
        .interact_text()
        .unwrap_or(default)
}

/// Asks for the API key. Blank answers and prompt failures yield `None`.
fn prompt_api_key() -> Option<String> {
    Password::new()
        .with_prompt("Gemini API key (leave blank to skip)")
        .allow_empty_password(true)
        .interact()
        .ok()
        .filter(|key| !key.trim().is_empty())
}

fn prompt_settings() -> ServerSettings {
    let bind_addr = prompt_or("Bind address", DEFAULT_BIND_ADDR.to_string());
    let port = prompt_or("Port", DEFAULT_PORT);

    let api_key = if has_api_key(|var| std::env::var(var).ok()) {
        None
    } else {
        let key = prompt_api_key();
        if key.is_none() {
            println!("No API key configured; analysis and chat requests will fail.");
        }
        key
    };

    ServerSettings {
        bind_addr,
        port,
        api_key,
    }
}

/// Runs the server in interactive mode, prompting for configuration.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Urbis Server");
    println!();

    let settings = prompt_settings();

    let start = Confirm::new()
        .with_prompt(format!(
            "Start server on {}:{}?",
            settings.bind_addr, settings.port
        ))
        .default(true)
        .interact()
        .unwrap_or(true);
    if !start {
        println!("Cancelled.");
        return Ok(());
    }

    // SAFETY: No other threads exist yet. The variables are read once while
    // the server starts.
    unsafe {
        for (name, value) in settings.env_vars() {
            std::env::set_var(name, value);
        }
    }

    super::run_server().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_keys_do_not_count_as_configured() {
        assert!(!has_api_key(|_| None));
        assert!(!has_api_key(|_| Some("  ".to_string())));
        assert!(has_api_key(|var| {
            (var == "API_KEY").then(|| "secret".to_string())
        }));
    }

    #[test]
    fn env_vars_only_set_an_entered_key() {
        let mut settings = ServerSettings {
            bind_addr: "0.0.0.0".to_string(),
            port: 9000,
            api_key: None,
        };
        assert_eq!(
            settings.env_vars(),
            vec![
                ("BIND_ADDR", "0.0.0.0".to_string()),
                ("PORT", "9000".to_string()),
            ]
        );

        settings.api_key = Some("secret".to_string());
        assert_eq!(
            settings.env_vars().last(),
            Some(&("GEMINI_API_KEY", "secret".to_string()))
        );
    }
}
