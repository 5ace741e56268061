//! Integration tests for private commands and nation card shards
//!
//! These tests verify the prepare/execute protocol, that a rejected prepare
//! never reaches the execute phase, and the one-step issue answer.

mod common;

use common::test_client;
use nsapi::app::{AuthSession, CommandExecutor, Nation, Params};
use nsapi::errors::ApiError;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn authenticated(name: &str) -> Nation {
    Nation::new(name).with_session(AuthSession::with_autologin("auto-token").unwrap())
}

#[tokio::test]
async fn test_rejected_prepare_never_executes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("c", "giftcard"))
        .and(query_param("mode", "prepare"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<NATION id=\"testlandia\"><ERROR>You do not own that card.</ERROR></NATION>",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("mode", "execute"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<NATION/>"))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = test_client(&server);
    let mut nation = authenticated("testlandia");

    match nation.gift_card(&mut client, 42, 3, "Other Nation").await {
        Err(ApiError::CommandRejected { command, message }) => {
            assert_eq!(command, "giftcard");
            assert_eq!(message, "You do not own that card.");
        }
        other => panic!("expected a rejected command, got {other:?}"),
    }
}

#[tokio::test]
async fn test_prepared_command_executes_with_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("mode", "prepare"))
        .and(query_param("cardid", "42"))
        .and(query_param("season", "3"))
        .and(query_param("to", "other_nation"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<NATION id=\"testlandia\"><SUCCESS>token-123</SUCCESS></NATION>"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("mode", "execute"))
        .and(query_param("token", "token-123"))
        .and(query_param("cardid", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<NATION id=\"testlandia\"><SUCCESS>Gifted the card.</SUCCESS></NATION>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = test_client(&server);
    let mut nation = authenticated("testlandia");

    let result = nation
        .gift_card(&mut client, 42, 3, "Other Nation")
        .await
        .unwrap();
    assert_eq!(result.text_of("SUCCESS").unwrap(), "Gifted the card.");
}

#[tokio::test]
async fn test_empty_token_is_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("mode", "prepare"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<NATION><SUCCESS>  </SUCCESS></NATION>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut client = test_client(&server);
    let mut nation = authenticated("testlandia");
    let result = CommandExecutor::new()
        .execute(&mut client, &mut nation, "dispatch", Params::new().with("title", "x"))
        .await;
    assert!(matches!(result, Err(ApiError::CommandRejected { .. })));
}

#[tokio::test]
async fn test_issue_answer_is_a_single_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("c", "issue"))
        .and(query_param("issue", "17"))
        .and(query_param("option", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<NATION id=\"testlandia\"><ISSUE id=\"17\" choice=\"1\"><OK>1</OK><DESC>Done.</DESC></ISSUE></NATION>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = test_client(&server);
    let mut nation = authenticated("testlandia");

    let outcome = nation.answer_issue(&mut client, 17, 1).await.unwrap();
    assert_eq!(outcome.attr("id"), Some("17"));
    assert_eq!(outcome.text_of("DESC").unwrap(), "Done.");
}

#[tokio::test]
async fn test_deck_is_requested_at_world_level() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("nationname", "testlandia"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<CARDS><DECK>\
             <CARD><CARDID>1</CARDID><CATEGORY>common</CATEGORY><SEASON>2</SEASON></CARD>\
             <CARD><CARDID>9</CARDID><CATEGORY>legendary</CATEGORY><SEASON>3</SEASON></CARD>\
             </DECK></CARDS>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = test_client(&server);
    let nation = Nation::new("Testlandia");

    let deck = nation.deck(&mut client).await.unwrap();
    assert_eq!(deck.len(), 2);
    assert_eq!(deck[1].id, 9);
    assert_eq!(deck[1].rarity, "legendary");
}
