//! Integration tests for the negotiation lifecycle.
//!
//! Wires the engine to the in-memory adapters and drives whole
//! negotiations through it: offers and counters, acceptance side
//! effects, fallback behavior, branching, resume, and export.

use std::sync::Arc;
use std::time::Duration;

use haggle::adapters::events::InMemoryEventBus;
use haggle::ports::ProductService;
use haggle::adapters::memory::{
    InMemoryNegotiationStore, InMemoryProductService, InMemoryStatsService,
};
use haggle::adapters::policy::{MockPolicy, PolicyCoordinator};
use haggle::application::{
    ContextCoordinator, ExportFormat, NegotiationEngine, NegotiationSnapshot, PostMessageCommand,
    StartNegotiationCommand, SubmitOfferCommand,
};
use haggle::config::NegotiationDefaults;
use haggle::domain::analytics::NegotiationInsights;
use haggle::domain::foundation::{Currency, ErrorCode, ProductId, UserId};
use haggle::domain::negotiation::{MessageSender, NegotiationStatus};
use haggle::domain::pricing::PricingDecision;
use haggle::ports::{PolicyError, ProductSnapshot};

struct World {
    engine: NegotiationEngine,
    store: Arc<InMemoryNegotiationStore>,
    bus: Arc<InMemoryEventBus>,
    products: Arc<InMemoryProductService>,
    stats: Arc<InMemoryStatsService>,
    product_id: ProductId,
}

fn buyer() -> UserId {
    UserId::new("buyer-1").unwrap()
}

fn seller() -> UserId {
    UserId::new("seller-1").unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn world(policy: MockPolicy) -> World {
    init_tracing();
    let store = Arc::new(InMemoryNegotiationStore::new());
    let products = Arc::new(InMemoryProductService::new());
    let stats = Arc::new(InMemoryStatsService::new());
    let bus = Arc::new(InMemoryEventBus::new());

    let product_id = ProductId::new();
    products.insert(ProductSnapshot {
        id: product_id,
        title: "Vintage road bike".to_string(),
        seller_id: seller(),
        base_price: 900.0,
        min_price: 750.0,
        currency: Currency::Usd,
        available: true,
    });

    let coordinator = Arc::new(PolicyCoordinator::new(
        Arc::new(policy),
        Duration::from_millis(200),
    ));
    let engine = NegotiationEngine::new(
        store.clone(),
        products.clone(),
        stats.clone(),
        bus.clone(),
        coordinator,
        NegotiationDefaults::default(),
    );

    World {
        engine,
        store,
        bus,
        products,
        stats,
        product_id,
    }
}

async fn start(w: &World, offer: f64) -> haggle::domain::negotiation::Negotiation {
    w.engine
        .start(StartNegotiationCommand {
            product_id: w.product_id,
            buyer_id: buyer(),
            initial_offer: offer,
            message: Some(format!("Would you take {}?", offer)),
        })
        .await
        .unwrap()
}

async fn offer(
    w: &World,
    id: haggle::domain::foundation::NegotiationId,
    amount: f64,
) -> Result<haggle::domain::negotiation::Negotiation, haggle::domain::foundation::DomainError> {
    w.engine
        .submit_offer(SubmitOfferCommand {
            negotiation_id: id,
            actor_id: buyer(),
            amount,
            note: None,
        })
        .await
}

#[tokio::test]
async fn haggling_to_a_deal_end_to_end() {
    let w = world(MockPolicy::scripted(vec![
        PricingDecision::keep_talking(0.6, "800 is a little light, but let's talk."),
        PricingDecision::counter(870.0, 0.9, "I could do 870."),
        PricingDecision::counter(850.0, 0.85, "Meet me at 850 and it's yours."),
        PricingDecision::accept(0.95, "Deal at 845."),
    ]));

    let n = start(&w, 800.0).await;
    let id = n.id();
    // The opening offer already drew the AI's first reply.
    assert_eq!(n.status(), NegotiationStatus::InProgress);
    let first_reply = n.last_message().unwrap();
    assert_eq!(first_reply.sender(), MessageSender::Ai);
    assert_eq!(n.rounds(), 0);

    let n = offer(&w, id, 820.0).await.unwrap();
    assert_eq!(n.rounds(), 1);
    assert_eq!(n.pricing().current_offer(), 870.0);

    let n = offer(&w, id, 840.0).await.unwrap();
    assert_eq!(n.rounds(), 2);
    assert_eq!(n.pricing().current_offer(), 850.0);

    let n = offer(&w, id, 845.0).await.unwrap();
    assert_eq!(n.status(), NegotiationStatus::Accepted);
    assert_eq!(n.pricing().current_offer(), 845.0);
    assert_eq!(n.rounds(), 3);

    // Side effects of acceptance.
    assert!(!w.products.get_product(w.product_id).await.unwrap().available);
    assert_eq!(w.stats.sales_for(&seller()), 1);

    // Event trail, in order.
    let types: Vec<String> = w
        .bus
        .published_events()
        .into_iter()
        .map(|e| e.event_type)
        .collect();
    assert!(types.contains(&"negotiation.started".to_string()));
    assert!(types.contains(&"negotiation.accepted".to_string()));
    let accepted = w.bus.events_of_type("negotiation.accepted");
    assert_eq!(accepted[0].payload["Accepted"]["final_price"], 845.0);

    // A closed negotiation refuses further offers.
    let err = offer(&w, id, 850.0).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NegotiationClosed);
}

#[tokio::test]
async fn lowball_rejection_closes_the_negotiation() {
    let w = world(MockPolicy::scripted(vec![
        PricingDecision::keep_talking(0.6, "That's a stretch, but go on."),
        PricingDecision::reject(0.9, "That's far below what this is worth."),
    ]));

    let n = start(&w, 600.0).await;
    let n = offer(&w, n.id(), 580.0).await.unwrap();

    assert_eq!(n.status(), NegotiationStatus::Rejected);
    assert!(w.bus.has_event("negotiation.rejected"));
    assert!(w.products.get_product(w.product_id).await.unwrap().available);
    assert_eq!(w.stats.sales().len(), 0);
}

#[tokio::test]
async fn policy_outage_still_answers_via_fallback() {
    let w = world(MockPolicy::failing(PolicyError::Network(
        "connection refused".to_string(),
    )));

    let n = start(&w, 800.0).await;
    // 830 >= 750 * 1.1: the heuristic counters at the midpoint to 900.
    let n = offer(&w, n.id(), 830.0).await.unwrap();

    assert_eq!(n.status(), NegotiationStatus::InProgress);
    assert_eq!(n.pricing().current_offer(), 865.0);
    assert!(w.bus.has_event("pricing.fallback_engaged"));

    let last = n.last_message().unwrap();
    assert_eq!(last.sender(), MessageSender::Ai);
    assert_eq!(last.metadata().get("fallback"), Some(&"true".to_string()));
}

#[tokio::test]
async fn round_limit_expires_instead_of_consulting_the_policy() {
    let w = world(MockPolicy::returning(PricingDecision::counter(
        880.0, 0.9, "880.",
    )));

    let n = start(&w, 800.0).await;
    let id = n.id();
    for _ in 0..5 {
        offer(&w, id, 820.0).await.unwrap();
    }

    let err = offer(&w, id, 825.0).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::RoundLimitExceeded);

    let stored = w.engine.get(id, &buyer()).await.unwrap();
    assert_eq!(stored.status(), NegotiationStatus::Expired);
    assert!(w.bus.has_event("negotiation.expired"));

    // One counter for the opening reply, five for the rounds, none for
    // the rejected sixth offer.
    assert_eq!(w.bus.events_of_type("negotiation.countered").len(), 6);
}

#[tokio::test]
async fn branching_explores_without_touching_main() {
    use haggle::application::CreateBranchCommand;
    use haggle::domain::negotiation::{BranchKind, BranchName, MessageQuery};

    let w = world(MockPolicy::returning(PricingDecision::keep_talking(
        0.6,
        "Happy to talk it through.",
    )));

    let n = start(&w, 800.0).await;
    let id = n.id();
    let name = BranchName::new("cash-today").unwrap();

    w.engine
        .create_branch(CreateBranchCommand {
            negotiation_id: id,
            actor_id: buyer(),
            name: name.clone(),
            kind: BranchKind::Scenario,
            parent: BranchName::main(),
        })
        .await
        .unwrap();
    w.engine.switch_branch(id, &buyer(), name.clone()).await.unwrap();
    w.engine
        .post_message(PostMessageCommand {
            negotiation_id: id,
            actor_id: buyer(),
            content: "What if I paid cash today?".to_string(),
        })
        .await
        .unwrap();

    // Main still shows only the opening exchange.
    let main_messages = w
        .engine
        .query_messages(id, &buyer(), &MessageQuery::all().on_branch(BranchName::main()))
        .await
        .unwrap();
    assert_eq!(main_messages.len(), 2);

    // The branch sees the inherited opening exchange plus its own.
    let branch_messages = w
        .engine
        .query_messages(id, &buyer(), &MessageQuery::all().on_branch(name))
        .await
        .unwrap();
    assert_eq!(branch_messages.len(), 4);
}

#[tokio::test]
async fn resume_summarizes_after_time_away() {
    let w = world(MockPolicy::returning(PricingDecision::counter(
        870.0,
        0.9,
        "I could do 870.",
    )));

    let n = start(&w, 800.0).await;
    let id = n.id();
    offer(&w, id, 820.0).await.unwrap();

    let coordinator = ContextCoordinator::new(w.store.clone());
    let summary = coordinator.switch_context(&buyer(), id).await.unwrap();

    assert_eq!(summary.current_offer, 870.0);
    assert_eq!(summary.round, 1);
    assert_eq!(summary.max_rounds, 5);
    assert_eq!(summary.last_message.unwrap().content, "I could do 870.");
    assert!(summary.seconds_since_activity >= 0);
    assert_eq!(coordinator.active_negotiation(&buyer()), Some(id));
}

#[tokio::test]
async fn export_and_insights_cover_the_timeline() {
    let w = world(MockPolicy::scripted(vec![
        PricingDecision::keep_talking(0.6, "Let's see where this goes."),
        PricingDecision::counter(870.0, 0.9, "I could do 870."),
    ]));

    let n = start(&w, 800.0).await;
    let n = offer(&w, n.id(), 820.0).await.unwrap();

    let snapshot = NegotiationSnapshot::capture(&n);
    let json = snapshot.render(ExportFormat::Json).unwrap();
    assert!(json.contains("Vintage road bike"));
    let csv = snapshot.render(ExportFormat::Csv).unwrap();
    assert_eq!(csv.lines().count(), 1 + n.messages().len());

    let insights = NegotiationInsights::derive(&n);
    assert_eq!(insights.rounds, 1);
    let amounts: Vec<f64> = insights.offer_trajectory.iter().map(|p| p.amount).collect();
    assert_eq!(amounts, vec![800.0, 820.0, 870.0]);
    assert_eq!(insights.counts.offers[&MessageSender::Ai], 1);
}

#[tokio::test]
async fn self_negotiation_is_blocked() {
    let w = world(MockPolicy::returning(PricingDecision::keep_talking(0.5, "ok")));
    let err = w
        .engine
        .start(StartNegotiationCommand {
            product_id: w.product_id,
            buyer_id: seller(),
            initial_offer: 800.0,
            message: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::SelfNegotiation);
}
