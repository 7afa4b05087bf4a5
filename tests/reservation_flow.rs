mod common;

use rust_decimal::Decimal;

use carshare::domain::{Actor, BookingStatus, DateRange, DomainError, UserRole, VehicleUpdateDto};
use carshare::Event;

use common::{date, market, UNVERIFIED_CAR, VERIFIED_CAR};

fn owner() -> Actor {
    Actor::new("ana", UserRole::Lessor)
}

fn client() -> Actor {
    Actor::new("juan", UserRole::Client)
}

fn admin() -> Actor {
    Actor::admin("root")
}

#[tokio::test]
async fn scenario_a_three_days_cost_three_hundred() {
    let market = market(true).await;

    let booking = market
        .request_booking(VERIFIED_CAR, "juan", date("2024-07-10"), date("2024-07-12"))
        .await
        .unwrap();

    assert_eq!(booking.total_price, Decimal::from(300));
    assert_eq!(booking.owner_id, "ana");
    assert!(matches!(
        booking.status,
        BookingStatus::Pending | BookingStatus::Confirmed
    ));

    let blocked = market.blocked_dates(VERIFIED_CAR).await;
    assert_eq!(blocked.len(), 3);
    assert!(blocked.contains(&date("2024-07-11")));
}

#[tokio::test]
async fn scenario_b_overlap_is_a_date_conflict() {
    let market = market(true).await;
    market
        .request_booking(VERIFIED_CAR, "juan", date("2024-07-10"), date("2024-07-12"))
        .await
        .unwrap();

    let err = market
        .request_booking(VERIFIED_CAR, "maria", date("2024-07-11"), date("2024-07-13"))
        .await
        .unwrap_err();

    match err {
        DomainError::DateConflict {
            vehicle_id,
            conflicting,
            dates,
        } => {
            assert_eq!(vehicle_id, VERIFIED_CAR);
            assert_eq!(conflicting, DateRange::parse("2024-07-10", "2024-07-12").unwrap());
            assert_eq!(dates, vec![date("2024-07-11"), date("2024-07-12")]);
        }
        other => panic!("expected DateConflict, got {:?}", other),
    }
    assert_eq!(market.bookings_for_client("maria").await.len(), 0);
}

#[tokio::test]
async fn scenario_c_end_before_start() {
    let market = market(true).await;
    let err = market
        .request_booking(VERIFIED_CAR, "juan", date("2024-07-20"), date("2024-07-15"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidDateRange { .. }));
}

#[tokio::test]
async fn scenario_d_reconfirm_is_an_invalid_transition() {
    let market = market(false).await;
    let booking = market
        .request_booking(VERIFIED_CAR, "juan", date("2024-07-10"), date("2024-07-12"))
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);

    let confirmed = market
        .update_status(booking.id, BookingStatus::Confirmed, &owner())
        .await
        .unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    let err = market
        .update_status(booking.id, BookingStatus::Confirmed, &client())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DomainError::InvalidTransition {
            from: BookingStatus::Confirmed,
            to: BookingStatus::Confirmed,
        }
    );
}

#[tokio::test]
async fn scenario_e_one_review_per_reviewer() {
    let market = market(true).await;
    let booking = market
        .request_booking(VERIFIED_CAR, "juan", date("2024-07-10"), date("2024-07-12"))
        .await
        .unwrap();
    market
        .update_status(booking.id, BookingStatus::Completed, &admin())
        .await
        .unwrap();

    let review = market
        .add_review(booking.id, "juan", 5, "great")
        .await
        .unwrap();
    assert_eq!(review.reviewee_id, "ana");
    assert_eq!(review.vehicle_id, VERIFIED_CAR);

    let err = market
        .add_review(booking.id, "juan", 5, "great")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::DuplicateReview { .. }));

    // The owner still has their own review to give.
    let back = market
        .add_review(booking.id, "ana", 4, "took good care of it")
        .await
        .unwrap();
    assert_eq!(back.reviewee_id, "juan");
    assert_eq!(market.reviews_for_booking(booking.id).await.len(), 2);
}

#[tokio::test]
async fn review_before_completion_is_refused() {
    let market = market(true).await;
    let booking = market
        .request_booking(VERIFIED_CAR, "juan", date("2024-07-10"), date("2024-07-12"))
        .await
        .unwrap();

    let err = market
        .add_review(booking.id, "juan", 5, "great")
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::NotCompleted(booking.id));
}

#[tokio::test]
async fn review_input_and_reviewer_are_checked() {
    let market = market(true).await;
    let booking = market
        .request_booking(VERIFIED_CAR, "juan", date("2024-07-10"), date("2024-07-10"))
        .await
        .unwrap();
    market
        .update_status(booking.id, BookingStatus::Completed, &owner())
        .await
        .unwrap();

    assert!(matches!(
        market.add_review(booking.id, "juan", 0, "meh").await,
        Err(DomainError::Validation(_))
    ));
    assert!(matches!(
        market.add_review(booking.id, "juan", 4, "   ").await,
        Err(DomainError::Validation(_))
    ));
    assert!(matches!(
        market.add_review(booking.id, "maria", 4, "never rode it").await,
        Err(DomainError::Unauthorized(_))
    ));
    assert!(matches!(
        market.add_review(99, "juan", 4, "which one?").await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn terminal_statuses_reject_every_transition() {
    let market = market(false).await;
    let mut day = date("2024-08-01");

    for terminal in [
        BookingStatus::Completed,
        BookingStatus::Cancelled,
        BookingStatus::Rejected,
    ] {
        let booking = market
            .request_booking(VERIFIED_CAR, "juan", day, day)
            .await
            .unwrap();
        day = day.succ_opt().unwrap();

        if terminal == BookingStatus::Completed {
            market
                .update_status(booking.id, BookingStatus::Confirmed, &admin())
                .await
                .unwrap();
        }
        market
            .update_status(booking.id, terminal, &admin())
            .await
            .unwrap();

        for next in BookingStatus::ALL {
            for actor in [owner(), client(), admin()] {
                let err = market
                    .update_status(booking.id, next, &actor)
                    .await
                    .unwrap_err();
                assert!(
                    matches!(err, DomainError::InvalidTransition { .. }),
                    "{} -> {} by {}: {:?}",
                    terminal,
                    next,
                    actor.role,
                    err
                );
            }
        }
    }
}

#[tokio::test]
async fn pending_booking_can_be_rejected_and_frees_dates() {
    let market = market(false).await;
    let booking = market
        .request_booking(VERIFIED_CAR, "juan", date("2024-07-10"), date("2024-07-12"))
        .await
        .unwrap();

    let rejected = market
        .update_status(booking.id, BookingStatus::Rejected, &owner())
        .await
        .unwrap();
    assert_eq!(rejected.status, BookingStatus::Rejected);
    assert!(market.blocked_dates(VERIFIED_CAR).await.is_empty());

    for next in BookingStatus::ALL {
        assert!(matches!(
            market.update_status(booking.id, next, &admin()).await,
            Err(DomainError::InvalidTransition { .. })
        ));
    }

    // Same dates are free again.
    market
        .request_booking(VERIFIED_CAR, "maria", date("2024-07-10"), date("2024-07-12"))
        .await
        .unwrap();
}

#[tokio::test]
async fn role_gates_on_transitions() {
    let market = market(false).await;
    let booking = market
        .request_booking(VERIFIED_CAR, "juan", date("2024-07-10"), date("2024-07-12"))
        .await
        .unwrap();

    // Client cannot confirm; another lessor cannot either.
    assert!(matches!(
        market
            .update_status(booking.id, BookingStatus::Confirmed, &client())
            .await,
        Err(DomainError::Unauthorized(_))
    ));
    assert!(matches!(
        market
            .update_status(
                booking.id,
                BookingStatus::Confirmed,
                &Actor::new("pedro", UserRole::Lessor)
            )
            .await,
        Err(DomainError::Unauthorized(_))
    ));
    // Refused attempts leave the booking untouched.
    assert_eq!(
        market.find_booking(booking.id).await.unwrap().status,
        BookingStatus::Pending
    );

    // Pending cannot jump to completed.
    assert!(matches!(
        market
            .update_status(booking.id, BookingStatus::Completed, &owner())
            .await,
        Err(DomainError::InvalidTransition { .. })
    ));

    let cancelled = market
        .update_status(booking.id, BookingStatus::Cancelled, &client())
        .await
        .unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn unknown_booking_is_not_found() {
    let market = market(true).await;
    assert!(matches!(
        market
            .update_status(42, BookingStatus::Cancelled, &admin())
            .await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn only_known_clients_book_discoverable_vehicles() {
    let market = market(true).await;

    assert!(matches!(
        market
            .request_booking(VERIFIED_CAR, "ana", date("2024-07-10"), date("2024-07-12"))
            .await,
        Err(DomainError::Unauthorized(_))
    ));
    assert!(matches!(
        market
            .request_booking(VERIFIED_CAR, "ghost", date("2024-07-10"), date("2024-07-12"))
            .await,
        Err(DomainError::Unauthorized(_))
    ));
    assert!(matches!(
        market
            .request_booking(UNVERIFIED_CAR, "juan", date("2024-07-10"), date("2024-07-12"))
            .await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        market
            .request_booking(77, "juan", date("2024-07-10"), date("2024-07-12"))
            .await,
        Err(DomainError::NotFound { .. })
    ));

    // Identifiers are case-insensitive.
    let booking = market
        .request_booking(VERIFIED_CAR, "JUAN", date("2024-07-10"), date("2024-07-10"))
        .await
        .unwrap();
    assert_eq!(booking.client_id, "juan");
}

#[tokio::test]
async fn totals_follow_inclusive_day_count() {
    let market = market(true).await;
    let spans = [
        ("2024-01-01", "2024-01-01"),
        ("2024-02-27", "2024-03-01"),
        ("2024-04-10", "2024-04-19"),
        ("2024-12-30", "2025-01-02"),
    ];

    for (start, end) in spans {
        let booking = market
            .request_booking(VERIFIED_CAR, "juan", date(start), date(end))
            .await
            .unwrap();
        let days = DateRange::new(booking.start_date, booking.end_date)
            .unwrap()
            .number_of_days();
        assert_eq!(booking.total_price, Decimal::from(days) * Decimal::from(100));
    }
}

#[tokio::test]
async fn overflowing_total_is_refused_without_booking() {
    let market = market(true).await;
    market
        .update_vehicle(
            &owner(),
            VERIFIED_CAR,
            VehicleUpdateDto {
                daily_price: Some("30000000000000000000000000000".parse().unwrap()),
                ..VehicleUpdateDto::default()
            },
        )
        .await
        .unwrap();

    let err = market
        .request_booking(VERIFIED_CAR, "juan", date("2024-07-10"), date("2024-07-12"))
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::Validation("total price overflows".into()));
    assert!(market.blocked_dates(VERIFIED_CAR).await.is_empty());

    // The vehicle stays bookable for spans that fit.
    market
        .request_booking(VERIFIED_CAR, "juan", date("2024-07-10"), date("2024-07-10"))
        .await
        .unwrap();
}

#[tokio::test]
async fn holding_bookings_never_overlap() {
    let market = market(true).await;

    // Deterministic pseudo-random spans over one summer.
    let base = date("2024-06-01");
    let mut seed: u64 = 0x2545_f491;
    for _ in 0..200 {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let offset = (seed >> 33) % 90;
        let len = (seed >> 17) % 6;
        let start = base + chrono::Duration::days(offset as i64);
        let end = start + chrono::Duration::days(len as i64);
        let _ = market.request_booking(VERIFIED_CAR, "juan", start, end).await;
    }

    let holding: Vec<_> = market
        .bookings_for_client("juan")
        .await
        .into_iter()
        .filter(|b| b.blocks_dates())
        .collect();
    assert!(!holding.is_empty());

    for (i, a) in holding.iter().enumerate() {
        for b in &holding[i + 1..] {
            assert!(
                !a.range().overlaps(&b.range()),
                "{} overlaps {}",
                a.range(),
                b.range()
            );
        }
    }
}

#[tokio::test]
async fn queries_list_newest_first() {
    let market = market(true).await;
    for day in ["2024-07-01", "2024-07-05", "2024-07-09"] {
        market
            .request_booking(VERIFIED_CAR, "juan", date(day), date(day))
            .await
            .unwrap();
    }

    let ids: Vec<_> = market
        .bookings_for_client("juan")
        .await
        .iter()
        .map(|b| b.id)
        .collect();
    assert_eq!(ids, vec![3, 2, 1]);
    assert_eq!(market.bookings_for_owner("ana").await.len(), 3);
    assert!(market.bookings_for_owner("pedro").await.is_empty());
}

#[tokio::test]
async fn mutations_publish_events() {
    let market = market(true).await;
    let mut events = market.subscribe();

    let booking = market
        .request_booking(VERIFIED_CAR, "juan", date("2024-07-10"), date("2024-07-12"))
        .await
        .unwrap();
    market
        .update_status(booking.id, BookingStatus::Completed, &owner())
        .await
        .unwrap();
    market
        .add_review(booking.id, "juan", 5, "great")
        .await
        .unwrap();

    match events.recv().await.unwrap().event {
        Event::BookingRequested(e) => {
            assert_eq!(e.booking_id, booking.id);
            assert_eq!(e.total_price, Decimal::from(300));
        }
        other => panic!("unexpected {:?}", other),
    }
    match events.recv().await.unwrap().event {
        Event::BookingStatusChanged(e) => {
            assert_eq!(e.old_status, BookingStatus::Confirmed);
            assert_eq!(e.new_status, BookingStatus::Completed);
            assert_eq!(e.acting_role, UserRole::Lessor);
        }
        other => panic!("unexpected {:?}", other),
    }
    match events.recv().await.unwrap().event {
        Event::ReviewAdded(e) => assert_eq!(e.rating, 5),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn booking_subscription_follows_one_booking() {
    let market = market(false).await;
    let first = market
        .request_booking(VERIFIED_CAR, "juan", date("2024-07-10"), date("2024-07-12"))
        .await
        .unwrap();
    let mut follow = market.subscribe_booking(first.id);

    let second = market
        .request_booking(VERIFIED_CAR, "maria", date("2024-08-01"), date("2024-08-02"))
        .await
        .unwrap();
    market
        .update_status(second.id, BookingStatus::Confirmed, &owner())
        .await
        .unwrap();
    market
        .update_status(first.id, BookingStatus::Rejected, &owner())
        .await
        .unwrap();

    match follow.recv().await.unwrap().event {
        Event::BookingStatusChanged(e) => {
            assert_eq!(e.booking_id, first.id);
            assert_eq!(e.new_status, BookingStatus::Rejected);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(follow.try_recv().is_none());
}

#[tokio::test]
async fn selector_reflects_current_bookings() {
    let market = market(true).await;
    market
        .request_booking(VERIFIED_CAR, "juan", date("2024-07-10"), date("2024-07-12"))
        .await
        .unwrap();

    let mut selector = market.selector(VERIFIED_CAR, date("2024-07-01")).await;
    selector.click(date("2024-07-08"));
    selector.click(date("2024-07-13"));

    // The span crosses the booked days, so the second click restarted.
    assert_eq!(selector.selection().start_date, Some(date("2024-07-13")));
    assert_eq!(selector.selection().end_date, None);
}
