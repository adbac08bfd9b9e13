//! Telegram webhook. Telegram redelivers on non-2xx, so everything short of a
//! store failure is answered with 200.

use lambda_http::{Body, Error, Request, Response};

use crate::conversation::{self, NOT_AUTHORIZED};
use crate::handler::Ctx;
use crate::model::Update;
use crate::telegram::notify;
use crate::util::{body_bytes, resp_text};

pub async fn handle_webhook(req: Request, ctx: &Ctx) -> Result<Response<Body>, Error> {
    let body = body_bytes(&req);
    let update: Update = match serde_json::from_slice(&body) {
        Ok(u) => u,
        Err(e) => {
            tracing::warn!(error = %e, "webhook body is not a telegram update");
            return resp_text(200, "OK");
        }
    };

    let Some(message) = update.message else {
        tracing::debug!(update_id = ?update.update_id, "update without message");
        return resp_text(200, "OK");
    };
    let (Some(text), Some(from), Some(chat)) = (message.text, message.from, message.chat) else {
        tracing::debug!(update_id = ?update.update_id, "message without text, sender or chat");
        return resp_text(200, "OK");
    };

    let user_id = from.id.to_string();
    if !ctx.config.is_allowed_sender(&user_id) {
        tracing::warn!(user_id = %user_id, "sender not on allow-list");
        notify(ctx.notifier.as_ref(), chat.id, NOT_AUTHORIZED).await;
        return resp_text(200, "Unauthorized");
    }

    let reply =
        conversation::advance(ctx.store.as_ref(), &user_id, &text, &ctx.config.base_url).await?;
    notify(ctx.notifier.as_ref(), chat.id, &reply).await;

    resp_text(200, "OK")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::config::tests::test_config;
    use crate::conversation::{ASK_FOR_KEY, GREETING, STATE_TTL};
    use crate::handler::testing::{body_text, failing_ctx, request, test_ctx, FailingStore};
    use crate::store::{KvStore, MemoryStore};
    use crate::telegram::testing::FailingNotifier;

    fn update(user: i64, chat: i64, text: &str) -> Request {
        let body = json!({
            "update_id": 1,
            "message": {
                "message_id": 9,
                "text": text,
                "from": {"id": user, "is_bot": false, "first_name": "T"},
                "chat": {"id": chat, "type": "private"}
            }
        });
        request(
            "POST",
            "https://s.example/hook-secret",
            Body::from(body.to_string()),
        )
    }

    #[tokio::test]
    async fn url_then_key_creates_link() {
        let (ctx, store, notifier) = test_ctx();

        let resp = handle_webhook(update(42, 4242, "https://example.com/page"), &ctx)
            .await
            .unwrap();
        assert_eq!(body_text(&resp), "OK");

        let resp = handle_webhook(update(42, 4242, "page"), &ctx).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(body_text(&resp), "OK");

        assert_eq!(
            store.get("/page").await.unwrap().as_deref(),
            Some("https://example.com/page")
        );
        assert_eq!(store.get("TSTATE_42").await.unwrap(), None);
        assert_eq!(
            notifier.sent(),
            vec![
                (4242, ASK_FOR_KEY.to_string()),
                (4242, "✅ Link created!\n\nhttps://s.example/page".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn unauthorized_sender_changes_nothing() {
        let (ctx, store, notifier) = test_ctx();

        for text in ["https://example.com", "key", "hello"] {
            let resp = handle_webhook(update(999, 999, text), &ctx).await.unwrap();
            assert_eq!(resp.status(), 200);
            assert_eq!(body_text(&resp), "Unauthorized");
        }

        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(notifier.texts(), vec![NOT_AUTHORIZED; 3]);
    }

    #[tokio::test]
    async fn plain_text_gets_greeting() {
        let (ctx, store, notifier) = test_ctx();
        handle_webhook(update(7, 70, "hello bot"), &ctx).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(notifier.sent(), vec![(70, GREETING.to_string())]);
    }

    #[tokio::test]
    async fn key_is_trimmed_but_link_uses_plain_key() {
        let (ctx, store, notifier) = test_ctx();
        handle_webhook(update(42, 1, "http://example.org"), &ctx).await.unwrap();
        handle_webhook(update(42, 1, "  promo \n"), &ctx).await.unwrap();

        assert_eq!(store.list().await.unwrap(), vec!["/promo"]);
        assert_eq!(
            notifier.texts().last().map(String::as_str),
            Some("✅ Link created!\n\nhttps://s.example/promo")
        );
    }

    #[tokio::test]
    async fn non_json_body_is_acknowledged() {
        let (ctx, store, notifier) = test_ctx();
        let req = request("POST", "https://s.example/hook-secret", Body::from("not json"));
        let resp = handle_webhook(req, &ctx).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(body_text(&resp), "OK");
        assert!(store.list().await.unwrap().is_empty());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn updates_without_text_are_acknowledged() {
        let (ctx, _store, notifier) = test_ctx();
        for body in [
            json!({"update_id": 2}),
            json!({"message": {"from": {"id": 42}, "chat": {"id": 42}}}),
            json!({"message": {"text": "hi", "chat": {"id": 42}}}),
        ] {
            let req = request(
                "POST",
                "https://s.example/hook-secret",
                Body::from(body.to_string()),
            );
            let resp = handle_webhook(req, &ctx).await.unwrap();
            assert_eq!(body_text(&resp), "OK");
        }
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_state_creates_no_entry() {
        let (ctx, store, notifier) = test_ctx();
        handle_webhook(update(42, 42, "https://example.com"), &ctx)
            .await
            .unwrap();

        tokio::time::advance(STATE_TTL + Duration::from_secs(1)).await;

        handle_webhook(update(42, 42, "late"), &ctx).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(notifier.texts(), vec![ASK_FOR_KEY, GREETING]);
    }

    #[tokio::test]
    async fn failed_replies_do_not_block_the_dialog() {
        let store = MemoryStore::new();
        let ctx = Ctx::new(
            test_config(),
            Arc::new(store.clone()),
            Arc::new(FailingNotifier),
        );

        handle_webhook(update(42, 42, "https://example.com"), &ctx)
            .await
            .unwrap();
        let resp = handle_webhook(update(42, 42, "k"), &ctx).await.unwrap();

        assert_eq!(body_text(&resp), "OK");
        assert_eq!(
            store.get("/k").await.unwrap().as_deref(),
            Some("https://example.com")
        );
    }

    #[tokio::test]
    async fn store_failure_is_an_error_and_sends_nothing() {
        let (ctx, notifier) = failing_ctx(FailingStore::everything());

        let result = handle_webhook(update(42, 42, "https://example.com"), &ctx).await;
        assert!(result.is_err());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn failed_link_write_keeps_the_dialog_open() {
        let inner = MemoryStore::new();
        let (ctx, notifier) = failing_ctx(FailingStore::on_key(inner.clone(), "/docs"));

        handle_webhook(update(42, 42, "https://example.com"), &ctx)
            .await
            .unwrap();
        let result = handle_webhook(update(42, 42, "docs"), &ctx).await;

        assert!(result.is_err());
        assert_eq!(notifier.texts(), vec![ASK_FOR_KEY.to_string()]);
        assert!(inner.get("TSTATE_42").await.unwrap().is_some());
    }
}
