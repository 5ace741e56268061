//! Two-phase private commands
//!
//! State-changing commands are sent twice: first with `mode=prepare`, which
//! must answer with a `SUCCESS` element holding a one-time token, then with
//! `mode=execute` and that token. Issue answers use a separate one-step form
//! and never go through here.

use tracing::{info, warn, Span};

use crate::app::client::NsClient;
use crate::app::query::{Params, ShardQuery};
use crate::app::shards::ShardSource;
use crate::app::xml::XmlElement;
use crate::errors::{ApiError, ApiResult};

const COMMAND_PARAM: &str = "c";
const MODE_PARAM: &str = "mode";
const TOKEN_PARAM: &str = "token";

/// Runs the prepare/execute protocol for one command at a time
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    span: Span,
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor {
    pub fn new() -> Self {
        Self {
            span: tracing::info_span!("command"),
        }
    }

    /// Attach a span that parents this executor's log events
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Prepare and then execute a command, returning the execute response
    ///
    /// # Arguments
    ///
    /// * `client` - Client the two requests go through
    /// * `source` - Authenticated entity the command acts for
    /// * `command` - Command name, e.g. `giftcard`
    /// * `params` - Command parameters, sent identically in both phases
    ///
    /// # Errors
    ///
    /// Returns `ApiError::CommandRejected` if the prepare response carries no
    /// token; the execute request is then never sent
    pub async fn execute<S: ShardSource + ?Sized>(
        &self,
        client: &mut NsClient,
        source: &mut S,
        command: &str,
        params: Params,
    ) -> ApiResult<XmlElement> {
        let base = Params::new().with(COMMAND_PARAM, command).merge(params);

        let prepare = ShardQuery::default().params(base.clone().with(MODE_PARAM, "prepare"));
        let prepared = client.request(&mut *source, prepare).await?;
        let token = match success_token(&prepared) {
            Some(token) => token,
            None => {
                let message = prepared
                    .descendants_named("ERROR")
                    .first()
                    .map(|error| error.content().trim().to_string())
                    .unwrap_or_else(|| "no success token in prepare response".to_string());
                warn!(parent: &self.span, "Command {} rejected: {}", command, message);
                return Err(ApiError::CommandRejected {
                    command: command.to_string(),
                    message,
                });
            }
        };

        info!(parent: &self.span, "Command {} prepared, executing", command);
        let execute = ShardQuery::default().params(
            base.with(MODE_PARAM, "execute")
                .with(TOKEN_PARAM, token),
        );
        client.request(source, execute).await
    }
}

fn success_token(response: &XmlElement) -> Option<String> {
    response
        .descendants_named("SUCCESS")
        .first()
        .map(|success| success.content().trim().to_string())
        .filter(|token| !token.is_empty())
}
