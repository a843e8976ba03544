//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, TimeZone, Utc};
use estate_core::{
  filter::{FilterSpec, RawFilters},
  listing::{Agent, DealStatus, Location, Purpose},
  pagination::PageRequest,
  personalize::{Recommendation, recommend},
  preference::{PurposeIntent, StyleIntent, UserPreference},
  search::execute,
  store::{CityMatch, CountMatch, ListingPredicate, ListingStore, ProjectLink, Range, Visibility, Window},
};

use crate::{SqliteStore, seed::NewListing};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// Two cities with one area each and a single agent.
struct World {
  store:     SqliteStore,
  riverside: Location,
  hillside:  Location,
  agent:     Agent,
}

async fn world() -> World {
  let s = store().await;
  let porto = s.add_city("Porto").await.unwrap();
  let lisbon = s.add_city("Lisbon").await.unwrap();
  let riverside = s.add_location("Riverside", Some(&porto)).await.unwrap();
  let hillside = s.add_location("Hillside", Some(&lisbon)).await.unwrap();
  let agent = s
    .add_agent("Ana", Some("+351 000"), Some("ana@example.com"))
    .await
    .unwrap();
  World { store: s, riverside, hillside, agent }
}

impl World {
  fn listing(&self, title: &str, price: f64, purpose: Purpose, at: &Location) -> NewListing {
    NewListing {
      location_id: Some(at.location_id.clone()),
      agent_id: Some(self.agent.agent_id.clone()),
      ..NewListing::new(title, price, purpose)
    }
  }

  async fn add(&self, input: NewListing) -> String {
    self.store.add_listing(input).await.unwrap()
  }

  async fn deal(&self, listing_id: &str, status: DealStatus) {
    self
      .store
      .add_deal(listing_id, &self.agent.agent_id, Purpose::Sale, status)
      .await
      .unwrap();
  }
}

fn compiled(raw: RawFilters) -> ListingPredicate {
  FilterSpec::compile(&raw).spec.into_predicate()
}

async fn ids(s: &SqliteStore, p: &ListingPredicate) -> Vec<String> {
  s.find_listings(p, Window::first(100))
    .await
    .unwrap()
    .into_iter()
    .map(|l| l.listing_id)
    .collect()
}

// ─── Relations ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn listing_relations_are_resolved() {
  let w = world().await;
  let villa = w.store.add_property_type("Villa").await.unwrap();
  let pool = w.store.add_amenity("Pool").await.unwrap();
  let gym = w.store.add_amenity("Gym").await.unwrap();

  let id = w
    .add(NewListing {
      type_id: Some(villa.type_id.clone()),
      amenity_ids: vec![pool.amenity_id.clone(), gym.amenity_id.clone()],
      image: Some("a.jpg".into()),
      gallery: vec!["a.jpg".into(), "b.jpg".into(), "c.jpg".into()],
      bedrooms: 4,
      ..w.listing("Villa with pool", 450_000.0, Purpose::Sale, &w.riverside)
    })
    .await;

  let l = w.store.get_listing(&id).await.unwrap().unwrap();
  assert_eq!(l.city_name(), Some("Porto"));
  assert_eq!(l.area_name(), Some("Riverside"));
  assert_eq!(l.property_type, Some(villa));
  assert_eq!(l.agent, Some(w.agent.clone()));
  assert_eq!(l.gallery, ["a.jpg", "b.jpg", "c.jpg"]);
  let amenities: Vec<_> = l.amenities.iter().map(|a| a.name.as_str()).collect();
  assert_eq!(amenities, ["Gym", "Pool"]);
  assert_eq!(l.bedrooms, 4);
}

#[tokio::test]
async fn null_relations_are_tolerated() {
  let s = store().await;
  let id = s
    .add_listing(NewListing::new("Bare", 10.0, Purpose::Rent))
    .await
    .unwrap();

  let l = s.get_listing(&id).await.unwrap().unwrap();
  assert!(l.location.is_none());
  assert!(l.agent.is_none());
  assert!(l.property_type.is_none());
  assert!(l.gallery.is_empty());

  let found = ids(&s, &ListingPredicate::default()).await;
  assert_eq!(found, [id]);
}

#[tokio::test]
async fn location_without_city_has_no_city() {
  let s = store().await;
  let orphan = s.add_location("Nowhere", None).await.unwrap();
  let id = s
    .add_listing(NewListing {
      location_id: Some(orphan.location_id),
      ..NewListing::new("Lost", 10.0, Purpose::Rent)
    })
    .await
    .unwrap();

  let l = s.get_listing(&id).await.unwrap().unwrap();
  assert_eq!(l.area_name(), Some("Nowhere"));
  assert_eq!(l.city_name(), None);
}

#[tokio::test]
async fn get_listing_missing_returns_none() {
  let s = store().await;
  assert!(s.get_listing("nope").await.unwrap().is_none());
}

// ─── Visibility ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn one_completed_deal_among_many_hides_the_listing() {
  let w = world().await;
  let sold = w.add(w.listing("Sold", 100.0, Purpose::Sale, &w.riverside)).await;
  let open = w.add(w.listing("Open", 100.0, Purpose::Sale, &w.riverside)).await;

  w.deal(&sold, DealStatus::Completed).await;
  for _ in 0..9 {
    w.deal(&sold, DealStatus::Pending).await;
  }
  w.deal(&open, DealStatus::Pending).await;
  w.deal(&open, DealStatus::Cancelled).await;

  let public = ListingPredicate::default();
  assert_eq!(ids(&w.store, &public).await, [open.clone()]);
  assert_eq!(w.store.count_listings(&public).await.unwrap(), 1);
}

#[tokio::test]
async fn listings_with_many_open_deals_are_not_duplicated() {
  let w = world().await;
  let id = w.add(w.listing("Busy", 100.0, Purpose::Sale, &w.riverside)).await;
  for _ in 0..5 {
    w.deal(&id, DealStatus::Pending).await;
  }

  assert_eq!(ids(&w.store, &ListingPredicate::default()).await, [id]);
  assert_eq!(w.store.count_listings(&ListingPredicate::default()).await.unwrap(), 1);
}

#[tokio::test]
async fn unrestricted_view_includes_sold_inventory() {
  let w = world().await;
  let sold = w.add(w.listing("Sold", 100.0, Purpose::Sale, &w.riverside)).await;
  w.deal(&sold, DealStatus::Completed).await;

  let agent_view = ListingPredicate {
    agent_id: Some(w.agent.agent_id.clone()),
    visibility: Visibility::All,
    ..Default::default()
  };
  assert_eq!(ids(&w.store, &agent_view).await, [sold.clone()]);
  assert!(ids(&w.store, &ListingPredicate::default()).await.is_empty());
}

#[tokio::test]
async fn completing_a_deal_later_hides_the_listing() {
  let w = world().await;
  let id = w.add(w.listing("Pending sale", 100.0, Purpose::Sale, &w.riverside)).await;
  let deal = w
    .store
    .add_deal(&id, &w.agent.agent_id, Purpose::Sale, DealStatus::Pending)
    .await
    .unwrap();
  assert!(!w.store.has_deal_with_status(&id, DealStatus::Completed).await.unwrap());

  let updated = w
    .store
    .set_deal_status(&deal.deal_id, DealStatus::Completed)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.status, DealStatus::Completed);
  assert!(w.store.has_deal_with_status(&id, DealStatus::Completed).await.unwrap());
  assert!(ids(&w.store, &ListingPredicate::default()).await.is_empty());
}

// ─── Filters ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn price_bounds_are_inclusive() {
  let w = world().await;
  for price in [499.0, 500.0, 1000.0, 1500.0, 1501.0] {
    w.add(w.listing(&format!("at {price}"), price, Purpose::Rent, &w.riverside)).await;
  }

  let p = compiled(RawFilters {
    min_price: Some("500".into()),
    max_price: Some("1500".into()),
    ..Default::default()
  });
  let found = w.store.find_listings(&p, Window::first(100)).await.unwrap();
  assert_eq!(found.len(), 3);
  assert!(found.iter().all(|l| (500.0..=1500.0).contains(&l.price)));
}

#[tokio::test]
async fn area_bounds_are_inclusive() {
  let w = world().await;
  for area in [59.5, 60.0, 90.0, 120.0, 120.5] {
    w.add(NewListing {
      area,
      ..w.listing(&format!("{area} m2"), 1.0, Purpose::Sale, &w.riverside)
    })
    .await;
  }

  let p = compiled(RawFilters {
    min_area: Some("60".into()),
    max_area: Some("120".into()),
    ..Default::default()
  });
  let mut areas: Vec<f64> = w
    .store
    .find_listings(&p, Window::first(100))
    .await
    .unwrap()
    .into_iter()
    .map(|l| l.area)
    .collect();
  areas.sort_by(f64::total_cmp);
  assert_eq!(areas, [60.0, 90.0, 120.0]);

  let open_top = compiled(RawFilters { min_area: Some("120".into()), ..Default::default() });
  assert_eq!(w.store.count_listings(&open_top).await.unwrap(), 2);
}

#[tokio::test]
async fn inverted_price_range_matches_nothing() {
  let w = world().await;
  w.add(w.listing("Mid", 1000.0, Purpose::Rent, &w.riverside)).await;

  let p = ListingPredicate { price: Range::between(1500.0, 500.0), ..Default::default() };
  assert_eq!(w.store.count_listings(&p).await.unwrap(), 0);
}

#[tokio::test]
async fn five_plus_bedrooms() {
  let w = world().await;
  let mut by_rooms = Vec::new();
  for bedrooms in [4, 5, 9] {
    let id = w
      .add(NewListing {
        bedrooms,
        ..w.listing(&format!("{bedrooms} bed"), 100.0, Purpose::Sale, &w.riverside)
      })
      .await;
    by_rooms.push((bedrooms, id));
  }

  let p = compiled(RawFilters { bedrooms: Some("5+".into()), ..Default::default() });
  let found = ids(&w.store, &p).await;
  assert_eq!(found.len(), 2);
  for (bedrooms, id) in &by_rooms {
    assert_eq!(found.contains(id), *bedrooms >= 5, "{bedrooms} bedrooms");
  }
}

#[tokio::test]
async fn exact_bathrooms() {
  let w = world().await;
  let two = w
    .add(NewListing { bathrooms: 2, ..w.listing("two", 1.0, Purpose::Sale, &w.riverside) })
    .await;
  w.add(NewListing { bathrooms: 3, ..w.listing("three", 1.0, Purpose::Sale, &w.riverside) })
    .await;

  let p = ListingPredicate { bathrooms: Some(CountMatch::Exactly(2)), ..Default::default() };
  assert_eq!(ids(&w.store, &p).await, [two]);
}

#[tokio::test]
async fn four_plus_bathrooms() {
  let w = world().await;
  let mut by_baths = Vec::new();
  for bathrooms in [3, 4, 6] {
    let id = w
      .add(NewListing {
        bathrooms,
        ..w.listing(&format!("{bathrooms} bath"), 1.0, Purpose::Sale, &w.riverside)
      })
      .await;
    by_baths.push((bathrooms, id));
  }

  let p = compiled(RawFilters { bathrooms: Some("4+".into()), ..Default::default() });
  let found = ids(&w.store, &p).await;
  assert_eq!(found.len(), 2);
  for (bathrooms, id) in &by_baths {
    assert_eq!(found.contains(id), *bathrooms >= 4, "{bathrooms} bathrooms");
  }
}

#[tokio::test]
async fn city_and_type_match_case_insensitively() {
  let w = world().await;
  let flat = w.store.add_property_type("Apartment").await.unwrap();
  let porto = w
    .add(NewListing {
      type_id: Some(flat.type_id.clone()),
      ..w.listing("Porto flat", 1.0, Purpose::Sale, &w.riverside)
    })
    .await;
  w.add(NewListing {
    type_id: Some(flat.type_id.clone()),
    ..w.listing("Lisbon flat", 1.0, Purpose::Sale, &w.hillside)
  })
  .await;

  let p = compiled(RawFilters {
    city: Some("pORTO".into()),
    kind: Some("apartment".into()),
    ..Default::default()
  });
  assert_eq!(ids(&w.store, &p).await, [porto]);
}

#[tokio::test]
async fn non_ascii_names_match_case_insensitively() {
  let s = store().await;
  let sao_paulo = s.add_city("São Paulo").await.unwrap();
  let centro = s.add_location("Centro", Some(&sao_paulo)).await.unwrap();
  let edifice = s.add_property_type("Édifice").await.unwrap();
  let id = s
    .add_listing(NewListing {
      location_id: Some(centro.location_id),
      type_id: Some(edifice.type_id),
      ..NewListing::new("Cobertura Élite", 1.0, Purpose::Sale)
    })
    .await
    .unwrap();
  s.add_listing(NewListing::new("Elsewhere", 1.0, Purpose::Sale))
    .await
    .unwrap();

  for raw in [
    RawFilters { city: Some("SÃO PAULO".into()), ..Default::default() },
    RawFilters { kind: Some("éDIFICE".into()), ..Default::default() },
    RawFilters { location: Some("SÃO".into()), ..Default::default() },
    RawFilters { location: Some("élite".into()), ..Default::default() },
  ] {
    let label = format!("{raw:?}");
    assert_eq!(ids(&s, &compiled(raw)).await, [id.clone()], "{label}");
  }
}

#[tokio::test]
async fn free_text_searches_title_area_and_city() {
  let w = world().await;
  let by_title = w.add(w.listing("Sunny loft", 1.0, Purpose::Rent, &w.hillside)).await;
  let by_area = w.add(w.listing("Quiet flat", 1.0, Purpose::Rent, &w.riverside)).await;
  let by_city = w.add(w.listing("Old house", 1.0, Purpose::Rent, &w.riverside)).await;

  let title = compiled(RawFilters { location: Some("SUNNY".into()), ..Default::default() });
  assert_eq!(ids(&w.store, &title).await, [by_title]);

  let area = compiled(RawFilters { location: Some("river".into()), ..Default::default() });
  let mut found = ids(&w.store, &area).await;
  found.sort();
  let mut want = vec![by_area, by_city];
  want.sort();
  assert_eq!(found, want);

  let city = compiled(RawFilters { location: Some("lisb".into()), ..Default::default() });
  assert_eq!(ids(&w.store, &city).await.len(), 1);
}

#[tokio::test]
async fn free_text_treats_wildcards_literally() {
  let w = world().await;
  let literal = w.add(w.listing("100% renovated", 1.0, Purpose::Sale, &w.riverside)).await;
  w.add(w.listing("1000 renovated", 1.0, Purpose::Sale, &w.riverside)).await;

  let p = compiled(RawFilters { location: Some("100%".into()), ..Default::default() });
  assert_eq!(ids(&w.store, &p).await, [literal]);
}

#[tokio::test]
async fn project_linkage() {
  let w = world().await;
  let project = w.store.add_project("Harbour Towers").await.unwrap();
  let unit = w
    .add(NewListing {
      project_id: Some(project),
      ..w.listing("Unit 4B", 1.0, Purpose::Sale, &w.riverside)
    })
    .await;
  let house = w.add(w.listing("House", 1.0, Purpose::Sale, &w.riverside)).await;

  let with = ListingPredicate { project: ProjectLink::With, ..Default::default() };
  let without = ListingPredicate { project: ProjectLink::Without, ..Default::default() };
  assert_eq!(ids(&w.store, &with).await, [unit]);
  assert_eq!(ids(&w.store, &without).await, [house]);
}

#[tokio::test]
async fn rent_scenario_excludes_completed_deal() {
  let w = world().await;
  let visible = w
    .add(NewListing { bedrooms: 2, ..w.listing("Visible", 1000.0, Purpose::Rent, &w.riverside) })
    .await;
  let rented = w
    .add(NewListing { bedrooms: 2, ..w.listing("Rented", 1000.0, Purpose::Rent, &w.riverside) })
    .await;
  w.store
    .add_deal(&rented, &w.agent.agent_id, Purpose::Sale, DealStatus::Completed)
    .await
    .unwrap();

  let p = compiled(RawFilters {
    purpose: Some("RENT".into()),
    min_price: Some("500".into()),
    max_price: Some("1500".into()),
    bedrooms: Some("2".into()),
    ..Default::default()
  });
  assert_eq!(ids(&w.store, &p).await, [visible]);
}

// ─── Ordering & pagination ───────────────────────────────────────────────────

#[tokio::test]
async fn newest_first_with_id_tiebreak() {
  let w = world().await;
  let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
  let old = w
    .add(NewListing { created_at: t0, ..w.listing("old", 1.0, Purpose::Sale, &w.riverside) })
    .await;
  let new = w
    .add(NewListing {
      created_at: t0 + Duration::days(1),
      ..w.listing("new", 1.0, Purpose::Sale, &w.riverside)
    })
    .await;
  let tie_a = w
    .add(NewListing { created_at: t0, ..w.listing("tie a", 1.0, Purpose::Sale, &w.riverside) })
    .await;

  let found = ids(&w.store, &ListingPredicate::default()).await;
  assert_eq!(found[0], new);
  let (hi, lo) = if old > tie_a { (old, tie_a) } else { (tie_a, old) };
  assert_eq!(found[1..], [hi, lo]);
}

#[tokio::test]
async fn pagination_totals_are_window_independent() {
  let w = world().await;
  for i in 0..25 {
    w.add(w.listing(&format!("#{i}"), 100.0, Purpose::Sale, &w.riverside)).await;
  }
  let p = ListingPredicate::default();

  let mut seen = Vec::new();
  for page in 1..=3 {
    let req = PageRequest { page, limit: 12 };
    let result = execute(&w.store, &p, req.window()).await.unwrap();
    assert_eq!(result.total, 25);
    assert_eq!(req.envelope(result.total).total_pages, 3);
    seen.extend(result.listings.into_iter().map(|l| l.listing_id));
  }
  assert_eq!(seen.len(), 25);
  seen.sort();
  seen.dedup();
  assert_eq!(seen.len(), 25);

  let beyond = PageRequest { page: 4, limit: 12 };
  let result = execute(&w.store, &p, beyond.window()).await.unwrap();
  assert!(result.listings.is_empty());
  assert_eq!(result.total, 25);

  let small = PageRequest { page: 1, limit: 5 };
  let result = execute(&w.store, &p, small.window()).await.unwrap();
  assert_eq!(result.listings.len(), 5);
  assert_eq!(small.envelope(result.total).total_pages, 5);
}

// ─── Preferences ─────────────────────────────────────────────────────────────

fn preference(user_id: &str, city_id: Option<String>) -> UserPreference {
  UserPreference {
    user_id: user_id.into(),
    purpose: PurposeIntent::Buy,
    city_id,
    property_type: None,
    style: StyleIntent::Both,
    min_price: 100_000.0,
    max_price: 200_000.0,
  }
}

#[tokio::test]
async fn preference_upsert_overwrites_wholesale() {
  let s = store().await;
  assert!(s.get_preference("u-1").await.unwrap().is_none());

  let first = UserPreference {
    property_type: Some("Villa".into()),
    city_id: Some("somewhere".into()),
    ..preference("u-1", None)
  };
  s.upsert_preference(first.clone()).await.unwrap();
  assert_eq!(s.get_preference("u-1").await.unwrap(), Some(first));

  let second = UserPreference {
    purpose: PurposeIntent::Rent,
    style: StyleIntent::Project,
    ..preference("u-1", None)
  };
  s.upsert_preference(second.clone()).await.unwrap();
  assert_eq!(s.get_preference("u-1").await.unwrap(), Some(second));
}

// ─── Personalization ─────────────────────────────────────────────────────────

#[tokio::test]
async fn exact_preference_match() {
  let w = world().await;
  let porto = w.riverside.city.clone().unwrap();
  let hit = w.add(w.listing("Porto home", 150_000.0, Purpose::Sale, &w.riverside)).await;
  w.add(w.listing("Lisbon home", 150_000.0, Purpose::Sale, &w.hillside)).await;
  w.store
    .upsert_preference(preference("u-1", Some(porto.city_id)))
    .await
    .unwrap();

  let rec = recommend(&w.store, "u-1").await.unwrap();
  assert!(!rec.is_near_match());
  let found: Vec<_> = rec.listings().iter().map(|l| l.listing_id.clone()).collect();
  assert_eq!(found, [hit]);
}

#[tokio::test]
async fn falls_back_to_other_cities_within_budget() {
  let w = world().await;
  let porto = w.riverside.city.clone().unwrap();
  let mut in_lisbon = Vec::new();
  for i in 0..3 {
    in_lisbon.push(
      w.add(w.listing(&format!("Lisbon {i}"), 150_000.0, Purpose::Sale, &w.hillside))
        .await,
    );
  }
  // Outside the band or the wrong purpose: never recommended.
  w.add(w.listing("Too dear", 900_000.0, Purpose::Sale, &w.hillside)).await;
  w.add(w.listing("Rental", 150_000.0, Purpose::Rent, &w.hillside)).await;
  // Inside the band but sold.
  let sold = w.add(w.listing("Sold", 150_000.0, Purpose::Sale, &w.hillside)).await;
  w.deal(&sold, DealStatus::Completed).await;

  w.store
    .upsert_preference(preference("u-1", Some(porto.city_id)))
    .await
    .unwrap();

  let rec = recommend(&w.store, "u-1").await.unwrap();
  assert!(rec.is_near_match());
  let mut found: Vec<_> = rec.listings().iter().map(|l| l.listing_id.clone()).collect();
  found.sort();
  in_lisbon.sort();
  assert_eq!(found, in_lisbon);
}

#[tokio::test]
async fn nothing_anywhere_is_empty() {
  let w = world().await;
  w.add(w.listing("Too dear", 900_000.0, Purpose::Sale, &w.hillside)).await;
  w.store
    .upsert_preference(preference("u-1", Some("city-a".into())))
    .await
    .unwrap();

  let rec = recommend(&w.store, "u-1").await.unwrap();
  assert!(matches!(rec, Recommendation::Empty));
  assert!(!rec.is_near_match());
}

#[tokio::test]
async fn recommendations_are_capped() {
  let w = world().await;
  for i in 0..25 {
    w.add(w.listing(&format!("#{i}"), 150_000.0, Purpose::Sale, &w.riverside)).await;
  }
  w.store.upsert_preference(preference("u-1", None)).await.unwrap();

  let rec = recommend(&w.store, "u-1").await.unwrap();
  assert_eq!(rec.listings().len(), 20);
}

#[tokio::test]
async fn city_id_predicate_uses_location_chain() {
  let w = world().await;
  let lisbon = w.hillside.city.clone().unwrap();
  let id = w.add(w.listing("Hill", 1.0, Purpose::Sale, &w.hillside)).await;
  w.add(w.listing("River", 1.0, Purpose::Sale, &w.riverside)).await;

  let p = ListingPredicate { city: Some(CityMatch::Id(lisbon.city_id)), ..Default::default() };
  assert_eq!(ids(&w.store, &p).await, [id]);
}
