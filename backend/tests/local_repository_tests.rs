//! Tests for LocalRepository: concurrent booking, status races and health handling.

mod support;

use std::sync::Arc;

use alloggi_backend::db::repositories::LocalRepository;
use alloggi_backend::db::repository::{
    ListingRepository, PhotoRepository, RepositoryError, ReservationRepository,
};
use alloggi_backend::models::{
    DateRange, ListingId, NewPhoto, NewReservation, PageRequest, PhotoKind, PhotoSource,
    ReservationFilter, ReservationStatus,
};
use support::{date, listing_input, money};

fn stay_on(listing_id: ListingId, from: (u32, u32), to: (u32, u32)) -> NewReservation {
    NewReservation {
        listing_id,
        check_in: date(2025, from.0, from.1),
        check_out: date(2025, to.0, to.1),
        guests: 2,
        guest_name: "Anna Verdi".to_string(),
        guest_email: "anna@example.com".to_string(),
        guest_phone: None,
        guest_notes: None,
        nights: 3,
        total_price: money("300"),
    }
}

fn photo(listing_id: ListingId, path: &str, order: i32) -> NewPhoto {
    NewPhoto {
        listing_id,
        source: PhotoSource::Image(path.to_string()),
        description: String::new(),
        kind: PhotoKind::Altro,
        order,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bookings_for_same_dates_admit_one() {
    let repo = Arc::new(LocalRepository::new());
    let listing = repo
        .create_listing(&listing_input("Casa Mare", "100"))
        .await
        .unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let repo = Arc::clone(&repo);
            let request = stay_on(listing.id, (8, 1), (8, 4));
            tokio::spawn(async move { repo.create_reservation(&request).await })
        })
        .collect();

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(e) if e.is_conflict() => conflicts += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicts, 15);
    assert_eq!(repo.reservation_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_disjoint_bookings_all_succeed() {
    let repo = Arc::new(LocalRepository::new());
    let listing = repo
        .create_listing(&listing_input("Casa Mare", "100"))
        .await
        .unwrap();

    let handles: Vec<_> = (1..=10u32)
        .map(|day| {
            let repo = Arc::clone(&repo);
            let request = stay_on(listing.id, (9, day * 2), (9, day * 2 + 2));
            tokio::spawn(async move { repo.create_reservation(&request).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(repo.reservation_count(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_transitions_apply_once() {
    let repo = Arc::new(LocalRepository::new());
    let listing = repo
        .create_listing(&listing_input("Casa Mare", "100"))
        .await
        .unwrap();
    let reservation = repo
        .create_reservation(&stay_on(listing.id, (8, 1), (8, 4)))
        .await
        .unwrap();

    let targets = [ReservationStatus::Confirmed, ReservationStatus::Refused];
    let handles: Vec<_> = targets
        .iter()
        .cycle()
        .take(8)
        .map(|to| {
            let repo = Arc::clone(&repo);
            let to = *to;
            tokio::spawn(async move {
                repo.set_reservation_status(reservation.id, ReservationStatus::Pending, to)
                    .await
            })
        })
        .collect();

    let mut applied = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            applied += 1;
        }
    }
    assert_eq!(applied, 1);

    let stored = repo.get_reservation(reservation.id).await.unwrap();
    assert!(targets.contains(&stored.status));
}

#[tokio::test]
async fn test_inactive_reservations_do_not_block() {
    let repo = LocalRepository::new();
    let listing = repo
        .create_listing(&listing_input("Casa Mare", "100"))
        .await
        .unwrap();
    let first = repo
        .create_reservation(&stay_on(listing.id, (8, 1), (8, 4)))
        .await
        .unwrap();

    let stay = DateRange::new(date(2025, 8, 2), date(2025, 8, 3));
    assert_eq!(
        repo.find_overlapping_reservations(listing.id, &stay, None)
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(repo
        .find_overlapping_reservations(listing.id, &stay, Some(first.id))
        .await
        .unwrap()
        .is_empty());

    repo.set_reservation_status(
        first.id,
        ReservationStatus::Pending,
        ReservationStatus::Cancelled,
    )
    .await
    .unwrap();
    assert!(repo
        .find_overlapping_reservations(listing.id, &stay, None)
        .await
        .unwrap()
        .is_empty());
    assert!(repo
        .create_reservation(&stay_on(listing.id, (8, 2), (8, 3)))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_reservation_on_missing_listing_is_not_found() {
    let repo = LocalRepository::new();
    let err = repo
        .create_reservation(&stay_on(ListingId::new(12), (8, 1), (8, 4)))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_update_reservation_keeps_status_and_checks_overlap() {
    let repo = LocalRepository::new();
    let listing = repo
        .create_listing(&listing_input("Casa Mare", "100"))
        .await
        .unwrap();
    let a = repo
        .create_reservation(&stay_on(listing.id, (8, 1), (8, 4)))
        .await
        .unwrap();
    repo.create_reservation(&stay_on(listing.id, (8, 10), (8, 12)))
        .await
        .unwrap();
    repo.set_reservation_status(a.id, ReservationStatus::Pending, ReservationStatus::Confirmed)
        .await
        .unwrap();

    let mut moved = repo.get_reservation(a.id).await.unwrap();
    moved.check_out = date(2025, 8, 11);
    moved.status = ReservationStatus::Pending;
    let err = repo.update_reservation(&moved).await.unwrap_err();
    assert!(err.is_conflict());

    moved.check_out = date(2025, 8, 6);
    moved.guest_notes = Some("Two bikes".to_string());
    let updated = repo.update_reservation(&moved).await.unwrap();
    assert_eq!(updated.check_out, date(2025, 8, 6));
    assert_eq!(updated.status, ReservationStatus::Confirmed);
}

#[tokio::test]
async fn test_reservations_listed_newest_first_with_paging() {
    let repo = LocalRepository::new();
    let listing = repo
        .create_listing(&listing_input("Casa Mare", "100"))
        .await
        .unwrap();
    let mut ids = Vec::new();
    for month in 3..=7 {
        let r = repo
            .create_reservation(&stay_on(listing.id, (month, 1), (month, 4)))
            .await
            .unwrap();
        ids.push(r.id);
    }

    let page = repo
        .list_reservations(&ReservationFilter {
            page: PageRequest::new(Some(1), Some(2)),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.total, 5);
    assert_eq!(page.num_pages(), 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].id, ids[4]);
    assert_eq!(page.items[1].id, ids[3]);
}

#[tokio::test]
async fn test_photos_for_listings_groups_requested_ids_only() {
    let repo = LocalRepository::new();
    let a = repo
        .create_listing(&listing_input("Casa Mare", "100"))
        .await
        .unwrap();
    let b = repo
        .create_listing(&listing_input("Casa Monti", "90"))
        .await
        .unwrap();
    let c = repo
        .create_listing(&listing_input("Casa Lago", "80"))
        .await
        .unwrap();
    repo.create_photo(&photo(a.id, "a2.jpg", 2)).await.unwrap();
    repo.create_photo(&photo(a.id, "a0.jpg", 0)).await.unwrap();
    repo.create_photo(&photo(b.id, "b0.jpg", 0)).await.unwrap();
    repo.create_photo(&photo(c.id, "c0.jpg", 0)).await.unwrap();

    let photos = repo.photos_for_listings(&[a.id, b.id]).await.unwrap();
    assert_eq!(photos.len(), 3);
    assert!(photos.iter().all(|p| p.listing_id != c.id));

    let on_a = repo.list_photos(Some(a.id)).await.unwrap();
    let paths: Vec<_> = on_a.iter().filter_map(|p| p.source.image()).collect();
    assert_eq!(paths, vec!["a0.jpg", "a2.jpg"]);
}

#[tokio::test]
async fn test_photo_for_missing_listing_is_not_found() {
    let repo = LocalRepository::new();
    let err = repo
        .create_photo(&photo(ListingId::new(3), "x.jpg", 0))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_unhealthy_repository_reports_unavailable() {
    let repo = LocalRepository::new();
    repo.set_healthy(false);

    assert!(!repo.health_check().await.unwrap());
    let err = repo
        .create_listing(&listing_input("Casa Mare", "100"))
        .await
        .unwrap_err();
    assert!(err.is_unavailable());
    assert!(matches!(err, RepositoryError::ConnectionError { .. }));

    repo.set_healthy(true);
    assert!(repo
        .create_listing(&listing_input("Casa Mare", "100"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_clear_resets_data_and_ids() {
    let repo = LocalRepository::new();
    repo.create_listing(&listing_input("Casa Mare", "100"))
        .await
        .unwrap();
    repo.clear();

    assert_eq!(repo.listing_count(), 0);
    let listing = repo
        .create_listing(&listing_input("Casa Mare", "100"))
        .await
        .unwrap();
    assert_eq!(listing.id, ListingId::new(1));
}

#[tokio::test]
async fn test_find_listing_by_name_is_exact() {
    let repo = LocalRepository::new();
    repo.create_listing(&listing_input("Casa Mare", "100"))
        .await
        .unwrap();

    assert!(repo.find_listing_by_name("Casa Mare").await.unwrap().is_some());
    assert!(repo.find_listing_by_name("casa mare").await.unwrap().is_none());
}
