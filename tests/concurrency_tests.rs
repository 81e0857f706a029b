mod common;

use common::{ADMIN, TestBot, test_config};
use rust_decimal_macros::dec;
use std::sync::Arc;
use swapdesk::application::engine::Dispatch;
use swapdesk::domain::asset::CryptoAsset;
use swapdesk::domain::message::{InboundEvent, Upload};
use swapdesk::domain::ports::TransactionStore;
use swapdesk::domain::transaction::{Evidence, NewTransaction, Order, TransactionStatus};
use swapdesk::error::BotError;
use swapdesk::infrastructure::in_memory::InMemoryTransactionStore;

fn sell(user: &str) -> NewTransaction {
    NewTransaction {
        user: user.to_string(),
        order: Order::Sell {
            asset: CryptoAsset::Usdt,
            amount: dec!(10),
        },
        rate: dec!(1),
        fiat_amount: dec!(0),
        evidence: Evidence::code("0xhash"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_leave_one_pending() {
    let store = Arc::new(InMemoryTransactionStore::new());
    let mut handles = Vec::new();
    for _ in 0..32 {
        let store = store.clone();
        handles.push(tokio::spawn(async move { store.create_pending(sell("1")).await }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(BotError::DuplicateSubmission(_)) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(created, 1);

    let (total, page) = store.count_and_list("1", 0, 10).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(page[0].status, TransactionStatus::Pending);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_repeated_final_step_submits_once() {
    let bot = TestBot::new().await;
    bot.press("1", "buy_btc").await;
    bot.text("1", "0.5").await;

    let mut handles = Vec::new();
    for i in 0..10 {
        let engine = bot.engine.clone();
        handles.push(tokio::spawn(async move {
            let upload = Upload::Photo {
                file_id: format!("proof-{i}"),
                size: 1024,
            };
            engine.handle(InboundEvent::upload("1", upload)).await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), Dispatch::Handled);
    }

    assert_eq!(bot.history("1").await.len(), 1);
    assert_eq!(bot.notifier.messages_for(ADMIN).len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sessions_run_independently() {
    let bot = Arc::new(TestBot::new().await);
    let mut handles = Vec::new();
    for i in 0..40 {
        let bot = bot.clone();
        handles.push(tokio::spawn(async move {
            let session = format!("s{i}");
            bot.submit_buy(&session).await
        }));
    }
    for handle in handles {
        let tx = handle.await.unwrap();
        assert_eq!(tx.status, TransactionStatus::Pending);
    }
    assert_eq!(bot.notifier.messages_for(ADMIN).len(), 40);
}

#[tokio::test]
async fn test_rate_limit_drops_silently() {
    let mut config = test_config();
    config.limits.rate_limit_events = 3;
    let bot = TestBot::with_config(config).await;

    for _ in 0..3 {
        assert_eq!(bot.text("1", "hello").await, Dispatch::Handled);
    }
    let before = bot.notifier.total();
    assert_eq!(bot.text("1", "hello").await, Dispatch::Dropped);
    assert_eq!(bot.press("1", "help").await, Dispatch::Dropped);
    assert_eq!(bot.notifier.total(), before);

    // other sessions keep their own budget
    assert_eq!(bot.text("2", "hello").await, Dispatch::Handled);
}
