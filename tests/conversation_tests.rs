mod common;

use common::{ADMIN, TestBot, test_config};
use rust_decimal_macros::dec;
use swapdesk::application::dialogue::Dialogue;
use swapdesk::domain::asset::{CryptoAsset, GiftCardBrand};
use swapdesk::domain::message::{InboundEvent, Upload};
use swapdesk::domain::transaction::{Order, TransactionKind, TransactionStatus};

#[tokio::test]
async fn test_buy_btc_end_to_end() {
    let bot = TestBot::new().await;
    bot.engine
        .handle(InboundEvent::text("1", "/start").with_display_name("alice"))
        .await;
    assert!(bot.notifier.last_for("1").actions().contains(&"buy_crypto"));

    bot.press("1", "buy_btc").await;
    assert_eq!(
        bot.engine.dialogue("1").await,
        Some(Dialogue::BuyAmount {
            asset: CryptoAsset::Btc
        })
    );
    assert!(bot.notifier.acks_for("1").contains(&None));

    bot.text("1", "0.5").await;
    assert_eq!(
        bot.engine.dialogue("1").await,
        Some(Dialogue::BuyProof {
            asset: CryptoAsset::Btc,
            amount: dec!(0.5),
            rate: dec!(50000),
            fiat_amount: dec!(25000),
        })
    );
    assert!(bot.notifier.last_for("1").text.contains("Total to Pay: $25000.00"));

    bot.photo("1", "proof-1").await;
    assert_eq!(bot.engine.dialogue("1").await, None);

    let history = bot.history("1").await;
    assert_eq!(history.len(), 1);
    let tx = &history[0];
    assert_eq!(tx.kind(), TransactionKind::Buy);
    assert_eq!(tx.status, TransactionStatus::Pending);
    assert_eq!(
        tx.order,
        Order::Buy {
            asset: CryptoAsset::Btc,
            amount: dec!(0.5)
        }
    );
    assert_eq!(tx.fiat_amount, dec!(25000));
    assert_eq!(tx.evidence.artifact.as_deref(), Some("proof-1"));

    let confirmation = bot.notifier.last_for("1");
    assert!(confirmation.text.contains(&tx.id.to_string()));
    assert!(confirmation.text.contains("Status: PENDING"));

    let notice = bot.notifier.last_for(ADMIN);
    assert!(notice.text.contains("User: alice (1)"));
    assert!(notice.actions().contains(&format!("approve_{}", tx.id).as_str()));
    assert!(notice.actions().contains(&format!("reject_{}", tx.id).as_str()));
}

#[tokio::test]
async fn test_invalid_amount_keeps_chosen_asset() {
    let bot = TestBot::new().await;
    bot.press("1", "buy_eth").await;

    for bad in ["abc", "0", "-5", "1000001", ""] {
        bot.text("1", bad).await;
        assert_eq!(
            bot.engine.dialogue("1").await,
            Some(Dialogue::BuyAmount {
                asset: CryptoAsset::Eth
            }),
            "input {bad:?} should re-prompt"
        );
        assert!(bot.notifier.last_for("1").text.contains("valid positive number"));
    }

    bot.text("1", "1000000").await;
    assert!(matches!(
        bot.engine.dialogue("1").await,
        Some(Dialogue::BuyProof { .. })
    ));
}

#[tokio::test]
async fn test_cancel_at_every_step_persists_nothing() {
    let mut config = test_config();
    config.defaults.wallets.usdt = "TQexample".to_string();
    let bot = TestBot::with_config(config).await;

    let routes: [&[&str]; 6] = [
        &["buy_btc"],
        &["buy_btc", "0.1"],
        &["sell_usdt"],
        &["sell_usdt", "20"],
        &["sell_apple"],
        &["sell_apple", "25 EUR"],
    ];
    for (i, route) in routes.iter().enumerate() {
        let session = format!("user-{i}");
        bot.press(&session, route[0]).await;
        for input in &route[1..] {
            bot.text(&session, input).await;
        }
        assert!(bot.engine.dialogue(&session).await.is_some());

        bot.text(&session, "  CaNcEl ").await;
        assert_eq!(bot.engine.dialogue(&session).await, None);
        let reply = bot.notifier.last_for(&session);
        assert!(reply.text.starts_with("Transaction cancelled."));
        assert_eq!(
            reply.actions(),
            vec![
                "buy_crypto",
                "sell_crypto",
                "sell_gift_cards",
                "transaction_history",
                "help"
            ]
        );
        assert!(bot.history(&session).await.is_empty());
    }
    assert!(bot.notifier.messages_for(ADMIN).is_empty());
}

#[tokio::test]
async fn test_gift_card_flow() {
    let bot = TestBot::new().await;
    bot.press("5", "sell_amazon").await;

    bot.text("5", "USD").await;
    assert!(bot.notifier.last_for("5").text.contains("valid amount"));
    bot.text("5", "50").await;
    assert!(bot.notifier.last_for("5").text.contains("currency/country"));
    assert!(matches!(
        bot.engine.dialogue("5").await,
        Some(Dialogue::GiftDetails { .. })
    ));

    bot.text("5", "50 usd").await;
    assert_eq!(
        bot.engine.dialogue("5").await,
        Some(Dialogue::GiftEvidence {
            brand: GiftCardBrand::Amazon,
            card_value: dec!(50),
            country: "USD".into(),
            rate: dec!(0.85),
            payout: dec!(42.5),
        })
    );
    let summary = bot.notifier.last_for("5").text;
    assert!(summary.contains("Payout Rate: 85%"));
    assert!(summary.contains("You will receive: $42.50"));

    bot.text("5", "ABCD-1234-<b>EFGH</b>").await;
    let history = bot.history("5").await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind(), TransactionKind::SellGiftCard);
    assert_eq!(history[0].evidence.code.as_deref(), Some("ABCD-1234-EFGH"));
    assert_eq!(history[0].fiat_amount, dec!(42.5));
    assert!(bot.notifier.last_for(ADMIN).text.contains("Card Code: ABCD-1234-EFGH"));
}

#[tokio::test]
async fn test_sell_without_wallet_ends_dialogue() {
    let bot = TestBot::new().await;
    bot.press("3", "sell_eth").await;
    bot.text("3", "1").await;

    assert_eq!(bot.engine.dialogue("3").await, None);
    assert_eq!(
        bot.notifier.last_for("3").text,
        "Wallet address not configured. Please contact support."
    );
    assert!(bot.history("3").await.is_empty());
}

#[tokio::test]
async fn test_sell_with_hash() {
    let mut config = test_config();
    config.defaults.wallets.btc = "bc1qreceiving".to_string();
    let bot = TestBot::with_config(config).await;

    bot.press("3", "sell_btc").await;
    bot.text("3", "0.25").await;
    assert!(bot.notifier.last_for("3").text.contains("bc1qreceiving"));

    bot.text("3", "   ").await;
    assert!(matches!(
        bot.engine.dialogue("3").await,
        Some(Dialogue::SellEvidence { .. })
    ));

    bot.text("3", "0xdeadbeef").await;
    let history = bot.history("3").await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind(), TransactionKind::Sell);
    assert_eq!(history[0].evidence.code.as_deref(), Some("0xdeadbeef"));
    assert_eq!(history[0].fiat_amount, dec!(0));
    assert!(bot.notifier.last_for(ADMIN).text.contains("TX Hash: 0xdeadbeef"));
}

#[tokio::test]
async fn test_invalid_uploads_are_refused() {
    let bot = TestBot::new().await;
    bot.press("4", "buy_usdt").await;
    bot.text("4", "100").await;

    let zip = Upload::Document {
        file_id: "archive".into(),
        size: 10,
        mime_type: Some("application/zip".into()),
    };
    let huge = Upload::Photo {
        file_id: "huge".into(),
        size: 11 * 1024 * 1024,
    };
    for upload in [zip, huge] {
        bot.engine.handle(InboundEvent::upload("4", upload)).await;
        assert!(bot.notifier.last_for("4").text.starts_with("Invalid file."));
        assert!(matches!(
            bot.engine.dialogue("4").await,
            Some(Dialogue::BuyProof { .. })
        ));
    }

    bot.text("4", "here is my receipt").await;
    assert!(matches!(
        bot.engine.dialogue("4").await,
        Some(Dialogue::BuyProof { .. })
    ));

    let pdf = Upload::Document {
        file_id: "receipt.pdf".into(),
        size: 2048,
        mime_type: Some("application/pdf".into()),
    };
    bot.engine.handle(InboundEvent::upload("4", pdf)).await;
    assert_eq!(bot.history("4").await.len(), 1);
}

#[tokio::test]
async fn test_duplicate_pending_of_same_kind_is_refused() {
    let bot = TestBot::new().await;
    bot.submit_buy("1").await;

    bot.press("1", "buy_eth").await;
    bot.text("1", "2").await;
    bot.photo("1", "proof-2").await;
    assert!(
        bot.notifier
            .last_for("1")
            .text
            .starts_with("You already have a pending transaction of this type.")
    );
    assert_eq!(bot.engine.dialogue("1").await, None);
    assert_eq!(bot.history("1").await.len(), 1);

    // another kind is independent
    bot.press("1", "sell_steam").await;
    bot.text("1", "20 USD").await;
    bot.text("1", "CODE").await;
    assert_eq!(bot.history("1").await.len(), 2);
}

#[tokio::test]
async fn test_idle_text_points_to_menu() {
    let bot = TestBot::new().await;
    bot.text("8", "hello").await;
    let reply = bot.notifier.last_for("8");
    assert_eq!(reply.text, "Use /start to open the menu.");
    assert_eq!(reply.actions(), vec!["main_menu"]);
}

#[tokio::test]
async fn test_start_resets_dialogue() {
    let bot = TestBot::new().await;
    bot.press("2", "buy_btc").await;
    bot.text("2", "/start").await;
    assert_eq!(bot.engine.dialogue("2").await, None);

    let menu = bot.notifier.last_for("2");
    assert!(!menu.actions().contains(&"admin_panel"));

    bot.text(ADMIN, "/start").await;
    assert!(bot.notifier.last_for(ADMIN).actions().contains(&"admin_panel"));
}

#[tokio::test]
async fn test_history_pages() {
    let bot = TestBot::new().await;
    bot.press("6", "transaction_history").await;
    assert_eq!(bot.notifier.last_for("6").text, "No transactions found.");

    for i in 0..7 {
        let tx = bot.submit_buy("6").await;
        bot.engine
            .workflow()
            .complete(tx.id, format!("iban {i}"))
            .await
            .unwrap();
    }

    bot.press("6", "transaction_history").await;
    let first = bot.notifier.last_for("6");
    assert!(first.text.starts_with("📊 Your Transaction History (Page 1)"));
    assert!(first.text.contains("1. ✅ Buy BTC"));
    assert!(first.text.contains("5. ✅ Buy BTC"));
    assert!(!first.text.contains("6. "));
    assert_eq!(first.actions(), vec!["history_page_2", "main_menu"]);

    bot.press("6", "history_page_2").await;
    let second = bot.notifier.last_for("6");
    assert!(second.text.contains("7. ✅ Buy BTC"));
    assert_eq!(second.actions(), vec!["transaction_history", "main_menu"]);

    bot.press("6", "history_page_9").await;
    assert!(bot.notifier.last_for("6").text.contains("(Page 2)"));
}
