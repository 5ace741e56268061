//! Nation handle, optionally authenticated

use tracing::info;

use super::{clean_format, shard_text, ShardSource, World};
use crate::app::client::{AuthSession, NsClient};
use crate::app::command::CommandExecutor;
use crate::app::models::{CardIdentifier, DeckInfo, Dossier, Issue, NationSnapshot};
use crate::app::query::{Params, ShardQuery};
use crate::app::xml::{split_list, XmlElement};
use crate::errors::{ApiError, ApiResult};

/// A nation, identified by name
#[derive(Debug, Clone)]
pub struct Nation {
    name: String,
    session: Option<AuthSession>,
}

impl ShardSource for Nation {
    fn key(&self) -> Params {
        Params::new().with("nation", &self.name)
    }

    fn session(&mut self) -> Option<&mut AuthSession> {
        self.session.as_mut()
    }
}

impl Nation {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: clean_format(name.as_ref()),
            session: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn auth(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    /// Attach credentials; later requests send and refresh them
    pub fn login(&mut self, session: AuthSession) {
        self.session = Some(session);
    }

    /// Attach credentials, builder style
    pub fn with_session(mut self, session: AuthSession) -> Self {
        self.login(session);
        self
    }

    /// Request arbitrary shards and return the NATION element
    pub async fn shards(&mut self, client: &mut NsClient, query: ShardQuery) -> ApiResult<XmlElement> {
        client.request(self, query).await
    }

    /// Text of one shard
    pub async fn shard(&mut self, client: &mut NsClient, shard: &str) -> ApiResult<String> {
        let root = self.shards(client, ShardQuery::new([shard])).await?;
        shard_text(&root, shard)
    }

    /// The standard public nation record
    pub async fn standard(&mut self, client: &mut NsClient) -> ApiResult<NationSnapshot> {
        let root = self.shards(client, ShardQuery::default()).await?;
        Ok(NationSnapshot::from_xml(&root)?)
    }

    /// Nations endorsing this one
    pub async fn endorsements(&mut self, client: &mut NsClient) -> ApiResult<Vec<String>> {
        let text = self.shard(client, "endorsements").await?;
        Ok(split_list(&text, ','))
    }

    /// World Assembly status, e.g. `WA Member` or `Non-member`
    pub async fn wa_status(&mut self, client: &mut NsClient) -> ApiResult<String> {
        self.shard(client, "wa").await
    }

    /// Name of the region the nation resides in
    pub async fn region(&mut self, client: &mut NsClient) -> ApiResult<String> {
        self.shard(client, "region").await
    }

    /// Register a login, refreshing the session's pin and autologin
    pub async fn ping(&mut self, client: &mut NsClient) -> ApiResult<()> {
        if self.session.is_none() {
            return Err(ApiError::MissingCredentials);
        }
        self.shards(client, ShardQuery::new(["ping"])).await?;
        Ok(())
    }

    /// The nation's autologin, requesting one from the server if not yet known
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingCredentials` without a session and
    /// `ApiError::Authentication` if the server issues no autologin
    pub async fn get_autologin(&mut self, client: &mut NsClient) -> ApiResult<String> {
        if let Some(known) = self.session.as_ref().and_then(AuthSession::autologin) {
            return Ok(known.to_string());
        }

        self.ping(client).await?;
        match self.session.as_ref().and_then(AuthSession::autologin) {
            Some(autologin) => {
                info!("Obtained autologin for {}", self.name);
                Ok(autologin.to_string())
            }
            None => Err(ApiError::authentication(format!(
                "no autologin issued for {}",
                self.name
            ))),
        }
    }

    /// Nations and regions in the dossier (private)
    pub async fn dossier(&mut self, client: &mut NsClient) -> ApiResult<Dossier> {
        let root = self
            .shards(client, ShardQuery::new(["dossier", "rdossier"]))
            .await?;
        Ok(Dossier::from_xml(&root))
    }

    /// Unanswered issues (private)
    pub async fn issues(&mut self, client: &mut NsClient) -> ApiResult<Vec<Issue>> {
        let root = self.shards(client, ShardQuery::new(["issues"])).await?;
        let issues = root
            .descendants_named("ISSUE")
            .into_iter()
            .map(Issue::from_xml)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(issues)
    }

    /// Answer an issue in one request and return the ISSUE outcome element
    ///
    /// This is not a two-phase command: the server applies the answer directly.
    pub async fn answer_issue(
        &mut self,
        client: &mut NsClient,
        issue: u32,
        option: i32,
    ) -> ApiResult<XmlElement> {
        let query = ShardQuery::default()
            .param("c", "issue")
            .param("issue", issue)
            .param("option", option);
        let root = self.shards(client, query).await?;
        match root.child("ISSUE") {
            Some(outcome) => Ok(outcome.clone()),
            None => Err(ApiError::MalformedResponse {
                reason: "issue answer has no ISSUE element".to_string(),
                payload: root.to_xml(),
            }),
        }
    }

    /// Cards in the nation's deck
    pub async fn deck(&self, client: &mut NsClient) -> ApiResult<Vec<CardIdentifier>> {
        let root = client.request(&mut World, self.card_query("deck")).await?;
        let cards = root
            .descendants_named("CARD")
            .into_iter()
            .map(CardIdentifier::from_xml)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cards)
    }

    /// Deck summary
    pub async fn deck_info(&self, client: &mut NsClient) -> ApiResult<DeckInfo> {
        let root = client.request(&mut World, self.card_query("info")).await?;
        let info = root
            .descendants_named("INFO")
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::MalformedResponse {
                reason: "deck info response has no INFO element".to_string(),
                payload: root.to_xml(),
            })?;
        Ok(DeckInfo::from_xml(info)?)
    }

    /// Gift a card to another nation through the two-phase command protocol
    pub async fn gift_card(
        &mut self,
        client: &mut NsClient,
        card_id: u64,
        season: u32,
        recipient: &str,
    ) -> ApiResult<XmlElement> {
        let params = Params::new()
            .with("cardid", card_id)
            .with("season", season)
            .with("to", clean_format(recipient));
        CommandExecutor::new()
            .with_span(client.span().clone())
            .execute(client, self, "giftcard", params)
            .await
    }

    /// Card shards are world-level requests naming the nation as a parameter
    fn card_query(&self, shard: &str) -> ShardQuery {
        ShardQuery::new(["cards", shard]).param("nationname", &self.name)
    }
}
