//! Plain-text rendering of store snapshots.

use tulip_core::{OrderAck, OrderRecord, OrdersBackend};
use tulip_store::{ApiStatusState, DeskSnapshot, LoadStatus, PersonaSnapshot, PulseState};

pub fn personas(snapshot: &PersonaSnapshot) -> String {
    let mut out = String::new();
    let active = snapshot.active();
    for persona in &snapshot.personas {
        let marker = if persona.user_id == active.user_id { "*" } else { " " };
        out.push_str(&format!("{marker} {:<20} {}", persona.user_id, persona.user_name));
        if !persona.bio.is_empty() {
            out.push_str(&format!("  ({})", persona.bio));
        }
        out.push('\n');
    }
    if snapshot.personas.is_empty() {
        out.push_str(&format!("  (no personas) acting as {}\n", active.user_name));
    }
    push_error(&mut out, snapshot.status, snapshot.error.as_deref());
    out
}

pub fn orders(snapshot: &DeskSnapshot) -> String {
    let mut out = format!("Recent orders ({})\n", snapshot.orders_backend.label());
    if snapshot.orders.is_empty() && snapshot.orders_status != LoadStatus::Error {
        out.push_str("  no orders yet\n");
    }
    for order in &snapshot.orders {
        out.push_str(&order_line(order));
        out.push('\n');
    }
    push_error(&mut out, snapshot.orders_status, snapshot.orders_error.as_deref());
    out
}

fn order_line(order: &OrderRecord) -> String {
    let accepted = order
        .accepted_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "  {:<19} {:<4} {:>12} x {:<6} {:<10} {}",
        accepted,
        order.side,
        order.price,
        order.quantity,
        order.status.as_deref().unwrap_or("-"),
        order.order_id,
    )
}

pub fn ack(ack: &OrderAck, backend: OrdersBackend) -> String {
    let mut out = format!("Order {} accepted on {}", ack.order_id, backend.label());
    if let Some(status) = &ack.status {
        out.push_str(&format!(" [{status}]"));
    }
    if let Some(region) = &ack.region {
        out.push_str(&format!(" region={region}"));
    }
    if let Some(ms) = ack.processing_ms {
        out.push_str(&format!(" in {ms:.1}ms"));
    }
    out.push('\n');
    out
}

pub fn pulse(state: &PulseState) -> String {
    let mut out = match &state.stats {
        Some(stats) => format!(
            "Last price {:.2}  sentiment {}% buy  ({} orders sampled)\n",
            stats.last_price,
            state.sentiment.unwrap_or_default(),
            stats.orders_sampled,
        ),
        None if state.status == LoadStatus::Ready => "No pulse data yet\n".to_string(),
        None => String::new(),
    };
    for point in &state.points {
        out.push_str(&format!(
            "  {}  avg {:.2}  buy {}  sell {}\n",
            point.ts, point.avg_price, point.buy_orders, point.sell_orders
        ));
    }
    push_error(&mut out, state.status, state.error.as_deref());
    out
}

pub fn status(state: &ApiStatusState) -> String {
    match (&state.config, state.error.as_deref()) {
        (Some(config), _) => {
            let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
            format!(
                "API reachable: version {} env {} region {} commit {}\n",
                field(&config.version),
                field(&config.env),
                field(&config.region),
                field(&config.commit),
            )
        }
        (None, Some(error)) => format!("{error}\n"),
        (None, None) => format!("API status: {}\n", state.status),
    }
}

fn push_error(out: &mut String, status: LoadStatus, error: Option<&str>) {
    if status == LoadStatus::Error {
        if let Some(error) = error {
            out.push_str(&format!("! {error}\n"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use tulip_core::{OrderSide, Persona, PulseStats};
    use tulip_store::{OrderDraft, SubmitState};

    #[test]
    fn test_personas_marks_active() {
        let snap = PersonaSnapshot {
            personas: vec![Persona::new("a", "Ann"), Persona::new("b", "Bob")],
            active_id: "b".to_string(),
            status: LoadStatus::Ready,
            error: None,
        };
        let text = personas(&snap);
        let lines: Vec<_> = text.lines().collect();
        assert!(lines[0].starts_with("  a"));
        assert!(lines[1].starts_with("* b"));
    }

    #[test]
    fn test_personas_shows_fallback_error() {
        let snap = PersonaSnapshot {
            personas: vec![Persona::new("a", "Ann")],
            active_id: "a".to_string(),
            status: LoadStatus::Error,
            error: Some("API unreachable".to_string()),
        };
        assert!(personas(&snap).ends_with("! API unreachable\n"));
    }

    #[test]
    fn test_orders_table() {
        let snap = DeskSnapshot {
            draft: OrderDraft::default(),
            submit: SubmitState::Idle,
            orders: vec![OrderRecord {
                order_id: "ord-9".to_string(),
                side: OrderSide::Sell,
                price: dec!(12.5),
                quantity: 3,
                status: Some("ACCEPTED".to_string()),
                accepted_at: Utc.timestamp_opt(1_700_000_000, 0).single(),
                region: None,
                processing_ms: None,
                user_id: None,
            }],
            orders_backend: OrdersBackend::Yugabyte,
            orders_status: LoadStatus::Ready,
            orders_error: None,
        };
        let text = orders(&snap);
        assert!(text.starts_with("Recent orders (YugabyteDB)"));
        assert!(text.contains("2023-11-14 22:13:20 SELL"));
        assert!(text.contains("ord-9"));
    }

    #[test]
    fn test_pulse_summary() {
        let state = PulseState {
            stats: Some(PulseStats {
                last_price: 101.456,
                buy_share: 0.62,
                sell_share: 0.38,
                orders_sampled: 50,
            }),
            sentiment: Some(62),
            status: LoadStatus::Ready,
            ..PulseState::default()
        };
        assert_eq!(
            pulse(&state),
            "Last price 101.46  sentiment 62% buy  (50 orders sampled)\n"
        );
    }

    #[test]
    fn test_status_without_config() {
        let state = ApiStatusState {
            config: None,
            status: LoadStatus::Error,
            error: Some("API unreachable".to_string()),
        };
        assert_eq!(status(&state), "API unreachable\n");
    }
}
