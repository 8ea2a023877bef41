use std::sync::Arc;

use alexandria::catalog::schema::FIELD_SEARCH_TIMES;
use alexandria::{
    BookDiscovery, DiscoveryConfig, FeatureHashEmbedder, FieldValue, FilterSpec,
    InMemoryCatalogIndex, InMemoryProfileStore, JsonFeed, ProfileStore, SearchOutcome, SortOrder,
    UserProfile,
};

fn corpus_feed() -> JsonFeed {
    JsonFeed::new(
        r#"[
        {"id": "dune", "title": "Dune", "author": "Frank Herbert",
         "genre": "SciFi", "publisher": "Chilton Books", "edition": 1,
         "publication_date": "1965-08-01", "ISBN-13": "9780441013593",
         "summary": "A desert planet, a spice that bends minds, and the fall of great houses"},
        {"id": "empire", "title": "A Memory Called Empire", "author": "Arkady Martine",
         "genre": "SciFi", "publisher": "Tor Books", "edition": 1,
         "publication_date": "2019-3-26", "ISBN-13": "9781250186430",
         "summary": "An ambassador unravels political intrigue at the heart of a galactic empire"},
        {"id": "pride", "title": "Pride and Prejudice", "author": "Jane Austen",
         "genre": "Romance", "publisher": "T. Egerton", "edition": 3,
         "publication_date": "1813-1-28", "ISBN-13": "9780141439518",
         "summary": "Manners, marriage and misjudgment in the English countryside"},
        {"id": "hobbit", "title": "The Hobbit", "author": "J. R. R. Tolkien",
         "genre": "Fantasy", "publisher": "Allen and Unwin", "edition": 1,
         "publication_date": "1937-09-21", "ISBN-13": "9780547928227",
         "summary": "A reluctant burglar walks to a dragon mountain and back again"}
    ]"#,
    )
}

struct Fixture {
    discovery: BookDiscovery,
    index: Arc<InMemoryCatalogIndex>,
    profiles: Arc<InMemoryProfileStore>,
}

async fn fixture() -> Fixture {
    let embedder = Arc::new(FeatureHashEmbedder::new());
    let index = Arc::new(InMemoryCatalogIndex::new());
    let profiles = Arc::new(InMemoryProfileStore::new());
    let discovery = BookDiscovery::new(
        embedder,
        index.clone(),
        profiles.clone(),
        DiscoveryConfig::default(),
    );
    let loaded = discovery.bootstrap(&corpus_feed()).await.unwrap();
    assert_eq!(loaded, 4);
    Fixture {
        discovery,
        index,
        profiles,
    }
}

fn stored_counter(index: &InMemoryCatalogIndex, id: &str) -> i64 {
    index
        .document(id)
        .unwrap()
        .get(FIELD_SEARCH_TIMES)
        .and_then(FieldValue::as_integer)
        .unwrap()
}

#[tokio::test]
async fn semantic_search_returns_records_and_feeds_popularity() {
    let fx = fixture().await;

    let outcome = fx
        .discovery
        .semantic("desert planet spice politics")
        .await
        .unwrap();
    let records = outcome.records();
    assert!(!records.is_empty());

    // Records snapshot the counter as of search time; the feedback lands
    // after the response is shaped.
    for record in records {
        assert_eq!(record.search_times, 0);
        assert_eq!(stored_counter(&fx.index, &record.id), 1);
    }
}

#[tokio::test]
async fn semantic_search_ranks_the_obvious_match_first() {
    let fx = fixture().await;

    let outcome = fx
        .discovery
        .semantic("a desert planet and a spice that bends minds")
        .await
        .unwrap();
    assert_eq!(outcome.records()[0].id, "dune");
}

#[tokio::test]
async fn empty_query_text_is_rejected() {
    let fx = fixture().await;
    let err = fx.discovery.semantic("   ").await.unwrap_err();
    assert!(err.is_client_error());
}

#[tokio::test]
async fn filtered_search_applies_only_present_clauses() {
    let fx = fixture().await;

    let filter = FilterSpec {
        genre: Some("SciFi".to_string()),
        publisher: None,
        ..FilterSpec::default()
    };
    let outcome = fx.discovery.filtered(&filter).await.unwrap();
    let mut ids: Vec<&str> = outcome.records().iter().map(|r| r.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["dune", "empire"]);
    assert!(outcome.records().iter().all(|r| r.genre == "SciFi"));
}

#[tokio::test]
async fn filtered_search_combines_phrase_and_term_clauses() {
    let fx = fixture().await;

    let filter = FilterSpec {
        author: Some("frank herbert".to_string()),
        genre: Some("SciFi".to_string()),
        ..FilterSpec::default()
    };
    let outcome = fx.discovery.filtered(&filter).await.unwrap();
    let ids: Vec<&str> = outcome.records().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["dune"]);
}

#[tokio::test]
async fn no_matching_filter_yields_the_no_results_sentinel() {
    let fx = fixture().await;

    let filter = FilterSpec {
        genre: Some("Poetry".to_string()),
        ..FilterSpec::default()
    };
    let outcome = fx.discovery.filtered(&filter).await.unwrap();
    assert!(outcome.is_no_matches());
    assert!(outcome.records().is_empty());

    // No results surfaced, so nothing was fed back.
    assert_eq!(stored_counter(&fx.index, "dune"), 0);
}

#[tokio::test]
async fn popularity_sorts_by_counter_and_never_increments() {
    let fx = fixture().await;

    // Bump exactly one book through a filtered search.
    let filter = FilterSpec {
        title: Some("Dune".to_string()),
        ..FilterSpec::default()
    };
    fx.discovery.filtered(&filter).await.unwrap();
    assert_eq!(stored_counter(&fx.index, "dune"), 1);

    let outcome = fx.discovery.popularity(SortOrder::Desc).await.unwrap();
    assert_eq!(outcome.records()[0].id, "dune");

    let ascending = fx.discovery.popularity(SortOrder::Asc).await.unwrap();
    assert_eq!(ascending.records().last().unwrap().id, "dune");

    // Two popularity queries surfaced every book twice; counters unchanged.
    assert_eq!(stored_counter(&fx.index, "dune"), 1);
    assert_eq!(stored_counter(&fx.index, "pride"), 0);
}

#[tokio::test]
async fn raw_order_strings_normalize_to_desc() {
    let fx = fixture().await;

    let normalized = fx
        .discovery
        .popularity(SortOrder::normalize("up"))
        .await
        .unwrap();
    let desc = fx.discovery.popularity(SortOrder::Desc).await.unwrap();
    assert_eq!(normalized, desc);
}

#[tokio::test]
async fn recommendation_with_empty_history_degrades_to_popularity() {
    let fx = fixture().await;

    fx.profiles
        .insert(UserProfile::new("new@example.com", "newreader"))
        .await
        .unwrap();

    let recommended = fx.discovery.recommend("new@example.com").await.unwrap();
    let popular = fx.discovery.popularity(SortOrder::Desc).await.unwrap();
    assert_eq!(recommended, popular);

    // The degraded path is popularity mode, so it is feedback-exempt too.
    assert_eq!(stored_counter(&fx.index, "dune"), 0);
}

#[tokio::test]
async fn recommendation_for_unknown_reader_degrades_to_popularity() {
    let fx = fixture().await;

    let recommended = fx.discovery.recommend("ghost@example.com").await.unwrap();
    let popular = fx.discovery.popularity(SortOrder::Desc).await.unwrap();
    assert_eq!(recommended, popular);
}

#[tokio::test]
async fn recommendation_excludes_already_read_books() {
    let fx = fixture().await;

    let mut profile = UserProfile::new("reader@example.com", "reader");
    profile.search_history = vec![
        "desert planet spice".to_string(),
        "galactic empire intrigue".to_string(),
    ];
    profile.read_books = vec!["dune".to_string()];
    fx.profiles.insert(profile).await.unwrap();

    let outcome = fx.discovery.recommend("reader@example.com").await.unwrap();
    let records = outcome.records();
    assert!(!records.is_empty());
    assert!(records.iter().all(|r| r.id != "dune"));

    // Personalized results do feed popularity.
    for record in records {
        assert_eq!(stored_counter(&fx.index, &record.id), 1);
    }
}

#[tokio::test]
async fn repeated_queries_increment_counters_exactly_once_each() {
    let fx = fixture().await;

    let n = 3;
    let mut surfaced: Vec<String> = Vec::new();
    for _ in 0..n {
        let outcome = fx.discovery.semantic("dragon mountain walk").await.unwrap();
        surfaced = outcome
            .records()
            .iter()
            .map(|r| r.id.clone())
            .collect();
    }
    for id in &surfaced {
        assert_eq!(stored_counter(&fx.index, id), n);
    }
}

#[tokio::test]
async fn empty_catalog_yields_no_matches_everywhere() {
    let embedder = Arc::new(FeatureHashEmbedder::new());
    let index = Arc::new(InMemoryCatalogIndex::new());
    let profiles = Arc::new(InMemoryProfileStore::new());
    let discovery = BookDiscovery::new(
        embedder,
        index.clone(),
        profiles,
        DiscoveryConfig::default(),
    );
    // Bootstrap over an empty feed only ensures the mapping.
    assert_eq!(discovery.bootstrap(&JsonFeed::new("[]")).await.unwrap(), 0);

    assert!(discovery.semantic("anything").await.unwrap().is_no_matches());
    assert!(discovery
        .filtered(&FilterSpec::default())
        .await
        .unwrap()
        .is_no_matches());
    assert!(discovery
        .popularity(SortOrder::Desc)
        .await
        .unwrap()
        .is_no_matches());
}

#[tokio::test]
async fn outcome_serializes_with_an_explicit_sentinel() {
    let json = serde_json::to_string(&SearchOutcome::NoMatches).unwrap();
    assert!(json.contains("no_matches"));
}
