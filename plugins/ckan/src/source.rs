use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};
use vizkit_core::cache::{cache_key, CacheExpiry, CacheStore};
use vizkit_core::configs::visualization::{Settings, SourceConfig, VisualizationConfig};
use vizkit_plugin_protocol::{
    ConfigForm, DataFilters, Field, FormElement, Record, SourceResult, VisualizationSource,
    RECORD_ID_FIELD,
};

use crate::client::{DatastoreClient, HttpDatastoreClient, SearchQuery};
use crate::resource::ResourceLocator;

/// Plugin key, also the prefix of every cache key this source writes.
pub const PLUGIN_KEY: &str = "ckan";

/// Rows requested per `datastore_search` page.
pub const PAGE_LIMIT: usize = 100;

/// Kind of payload stored in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Fields,
    Records,
}

impl ObjectType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fields => "fields",
            Self::Records => "records",
        }
    }
}

/// Source reading a CKAN datastore resource, cached and paginated.
pub struct CkanSource {
    uri: String,
    locator: ResourceLocator,
    filters: DataFilters,
    cache_expiry: CacheExpiry,
    default_cache_expiry: u64,
    cache: Arc<dyn CacheStore>,
    client: Arc<dyn DatastoreClient>,
}

impl CkanSource {
    pub fn new(
        source: &SourceConfig,
        settings: &Settings,
        filters: DataFilters,
        cache: Arc<dyn CacheStore>,
        client: Arc<dyn DatastoreClient>,
    ) -> SourceResult<Self> {
        let locator = ResourceLocator::parse(&source.uri)?;

        Ok(Self {
            uri: source.uri.clone(),
            locator,
            filters,
            cache_expiry: source.cache_expiry(),
            default_cache_expiry: settings.default_cache_expiry,
            cache,
            client,
        })
    }

    /// Build a source talking HTTP to the portal named in `config`.
    pub fn from_config(
        config: &VisualizationConfig,
        cache: Arc<dyn CacheStore>,
    ) -> SourceResult<Self> {
        let locator = ResourceLocator::parse(&config.source.uri)?;
        let client = Arc::new(HttpDatastoreClient::new(locator.base_url.clone()));

        Self::new(
            &config.source,
            &config.settings,
            config.style.data_filters(),
            cache,
            client,
        )
    }

    pub fn resource_id(&self) -> &str {
        &self.locator.resource_id
    }

    pub fn data_filters(&self) -> &DataFilters {
        &self.filters
    }

    pub fn cache_key(&self, object_type: ObjectType) -> String {
        cache_key(PLUGIN_KEY, self.resource_id(), object_type.as_str())
    }

    fn search_query(&self, limit: usize, offset: usize) -> SearchQuery {
        SearchQuery::new(self.resource_id(), limit, offset, &self.filters)
    }

    /// Fetch every remaining page, starting at `offset`, onto `records`.
    ///
    /// Any failed page discards everything gathered so far and yields an
    /// empty list.
    pub async fn fetch_records(
        &self,
        records: Vec<Record>,
        limit: usize,
        offset: usize,
    ) -> Vec<Record> {
        match self.try_fetch_records(records, limit, offset).await {
            Ok(records) => records,
            Err(e) => {
                warn!(resource = self.resource_id(), error = %e, "failed to fetch records");
                Vec::new()
            }
        }
    }

    async fn try_fetch_records(
        &self,
        mut records: Vec<Record>,
        limit: usize,
        mut offset: usize,
    ) -> SourceResult<Vec<Record>> {
        loop {
            let page = self
                .client
                .datastore_search(&self.search_query(limit, offset))
                .await?;

            let page_len = page.records.len();
            records.extend(page.records);
            offset = records.len();

            if page.total <= offset {
                break;
            }
            if page_len == 0 {
                warn!(
                    resource = self.resource_id(),
                    total = page.total,
                    offset,
                    "datastore returned an empty page before reaching its total"
                );
                break;
            }
        }

        debug!(resource = self.resource_id(), count = records.len(), "fetched records");
        Ok(records)
    }

    async fn try_fetch_fields(&self) -> SourceResult<Vec<Field>> {
        let result = self.client.datastore_search(&self.search_query(1, 0)).await?;
        Ok(result.fields)
    }

    async fn raw_fields(&self) -> Vec<Field> {
        let key = self.cache_key(ObjectType::Fields);
        if let Some(fields) = self.cached(&key) {
            return fields;
        }

        let fields = self.try_fetch_fields().await.unwrap_or_else(|e| {
            warn!(resource = self.resource_id(), error = %e, "failed to fetch fields");
            Vec::new()
        });
        self.store(&key, &fields);
        fields
    }

    async fn raw_records(&self) -> Vec<Record> {
        let key = self.cache_key(ObjectType::Records);
        if let Some(records) = self.cached(&key) {
            return records;
        }

        let records = self.fetch_records(Vec::new(), PAGE_LIMIT, 0).await;
        self.store(&key, &records);
        records
    }

    fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.cache.get(key)?;
        match serde_json::from_value(entry.value) {
            Ok(value) => {
                debug!(key, "cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "ignoring undecodable cache entry");
                None
            }
        }
    }

    fn store<T: Serialize>(&self, key: &str, value: &T) {
        let Some(ttl) = self.cache_expiry.ttl(self.default_cache_expiry) else {
            return;
        };

        match serde_json::to_value(value) {
            Ok(value) => self.cache.set(key, value, ttl),
            Err(e) => warn!(key, error = %e, "failed to encode cache entry"),
        }
    }
}

#[async_trait]
impl VisualizationSource for CkanSource {
    fn name(&self) -> &str {
        "CKAN Source"
    }

    fn key(&self) -> &str {
        PLUGIN_KEY
    }

    async fn get_fields(&self) -> IndexMap<String, String> {
        self.raw_fields()
            .await
            .into_iter()
            .map(|field| (field.id.clone(), field.id))
            .collect()
    }

    async fn get_records(&self) -> IndexMap<String, Record> {
        let fields = self.get_fields().await;
        let raw = self.raw_records().await;
        let keys = record_keys(&raw);

        let mut records: IndexMap<String, Record> = IndexMap::new();
        for field in fields.keys() {
            for (key, raw_record) in keys.iter().zip(&raw) {
                if let Some(value) = raw_record.get(field) {
                    records
                        .entry(key.clone())
                        .or_default()
                        .insert(field.clone(), value.clone());
                }
            }
        }

        records
    }

    fn configuration_form(&self) -> ConfigForm {
        let expiry = match self.cache_expiry {
            CacheExpiry::Default => "default".to_string(),
            CacheExpiry::Seconds(secs) => secs.to_string(),
        };

        let mut form = ConfigForm::new();
        form.push(
            FormElement::text_field("source.uri", "Resource URI")
                .with_description("URL of the CKAN resource, e.g. https://demo.ckan.org/dataset/<name>/resource/<id>.")
                .with_default(self.uri.clone()),
        );
        form.push(
            FormElement::select("source.cacheExpiry", "Cache expiry", CacheExpiry::form_options())
                .with_description("How long fetched fields and records are kept.")
                .with_default(expiry),
        );
        form
    }
}

/// Output map keys for `raw`, one per row.
///
/// A row is keyed by its `_id`. Rows without one get their row position,
/// suffixed with `-<n>` when that would clash with another row's key.
fn record_keys(raw: &[Record]) -> Vec<String> {
    let ids: Vec<Option<String>> = raw.iter().map(record_id).collect();
    let mut taken: HashSet<String> = ids.iter().flatten().cloned().collect();

    ids.into_iter()
        .enumerate()
        .map(|(index, id)| {
            id.unwrap_or_else(|| {
                let mut key = index.to_string();
                let mut n = 1;
                while taken.contains(&key) {
                    key = format!("{}-{}", index, n);
                    n += 1;
                }
                taken.insert(key.clone());
                key
            })
        })
        .collect()
}

fn record_id(record: &Record) -> Option<String> {
    match record.get(RECORD_ID_FIELD) {
        Some(JsonValue::String(id)) => Some(id.clone()),
        Some(JsonValue::Null) | None => None,
        Some(other) => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SearchResult;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;
    use vizkit_core::cache::MemoryCacheStore;
    use vizkit_plugin_protocol::SourceError;

    /// Serves `total` generated rows and fails on the configured offsets.
    struct FakeDatastore {
        total: usize,
        fail_at_offset: Option<usize>,
        calls: Mutex<Vec<SearchQuery>>,
    }

    impl FakeDatastore {
        fn new(total: usize) -> Self {
            Self {
                total,
                fail_at_offset: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing_at(total: usize, offset: usize) -> Self {
            Self {
                fail_at_offset: Some(offset),
                ..Self::new(total)
            }
        }

        fn calls(&self) -> Vec<SearchQuery> {
            self.calls.lock().unwrap().clone()
        }

        fn offsets(&self) -> Vec<usize> {
            self.calls().iter().map(|q| q.offset).collect()
        }
    }

    #[async_trait]
    impl DatastoreClient for FakeDatastore {
        async fn datastore_search(&self, query: &SearchQuery) -> SourceResult<SearchResult> {
            self.calls.lock().unwrap().push(query.clone());

            if self.fail_at_offset == Some(query.offset) {
                return Err(SourceError::Transport("connection reset".to_string()));
            }

            let end = (query.offset + query.limit).min(self.total);
            let records = (query.offset..end)
                .map(|i| {
                    serde_json::from_value(json!({"_id": i + 1, "year": 2000 + i, "value": i * 10}))
                        .unwrap()
                })
                .collect();

            Ok(SearchResult {
                fields: ["_id", "year", "value"].into_iter().map(Field::new).collect(),
                records,
                total: self.total,
            })
        }
    }

    struct Fixture {
        source: CkanSource,
        client: Arc<FakeDatastore>,
        cache: Arc<MemoryCacheStore>,
    }

    fn fixture_with(client: FakeDatastore, cache_expiry: Option<u64>, filters: DataFilters) -> Fixture {
        let client = Arc::new(client);
        let cache = Arc::new(MemoryCacheStore::new());
        let config = SourceConfig {
            plugin: PLUGIN_KEY.to_string(),
            uri: "https://demo.ckan.org/dataset/rain/resource/res-1".to_string(),
            cache_expiry,
        };
        let source = CkanSource::new(
            &config,
            &Settings::default(),
            filters,
            cache.clone(),
            client.clone(),
        )
        .unwrap();

        Fixture {
            source,
            client,
            cache,
        }
    }

    fn fixture(client: FakeDatastore) -> Fixture {
        fixture_with(client, None, DataFilters::default())
    }

    #[tokio::test]
    async fn paginates_until_total_is_reached() {
        let f = fixture(FakeDatastore::new(250));

        let records = f.source.fetch_records(Vec::new(), 100, 0).await;

        assert_eq!(records.len(), 250);
        assert_eq!(f.client.offsets(), vec![0, 100, 200]);
        assert_eq!(records[249]["_id"], json!(250));
    }

    #[tokio::test]
    async fn failed_page_discards_accumulated_records() {
        let f = fixture(FakeDatastore::failing_at(250, 100));

        let records = f.source.fetch_records(Vec::new(), 100, 0).await;

        assert!(records.is_empty());
        assert_eq!(f.client.offsets(), vec![0, 100]);
    }

    #[tokio::test]
    async fn stops_on_empty_page() {
        struct ShortDatastore;

        #[async_trait]
        impl DatastoreClient for ShortDatastore {
            async fn datastore_search(&self, _query: &SearchQuery) -> SourceResult<SearchResult> {
                Ok(SearchResult {
                    fields: vec![],
                    records: vec![],
                    total: 10,
                })
            }
        }

        let config = SourceConfig {
            plugin: PLUGIN_KEY.to_string(),
            uri: "https://demo.ckan.org/dataset/rain/resource/res-1".to_string(),
            cache_expiry: None,
        };
        let source = CkanSource::new(
            &config,
            &Settings::default(),
            DataFilters::default(),
            Arc::new(MemoryCacheStore::new()),
            Arc::new(ShortDatastore),
        )
        .unwrap();

        assert!(source.fetch_records(Vec::new(), 100, 0).await.is_empty());
    }

    #[tokio::test]
    async fn fields_are_fetched_once_and_cached() {
        let f = fixture(FakeDatastore::new(5));

        let fields = f.source.get_fields().await;
        let again = f.source.get_fields().await;

        let ids: Vec<_> = fields.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["_id", "year", "value"]);
        assert_eq!(fields["year"], "year");
        assert_eq!(fields, again);

        let calls = f.client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!((calls[0].limit, calls[0].offset), (1, 0));
        assert!(f.cache.get(&f.source.cache_key(ObjectType::Fields)).is_some());
    }

    #[tokio::test]
    async fn failed_field_fetch_caches_empty_list() {
        let f = fixture(FakeDatastore::failing_at(5, 0));

        assert!(f.source.get_fields().await.is_empty());
        assert!(f.source.get_fields().await.is_empty());

        assert_eq!(f.client.calls().len(), 1);
        let entry = f.cache.get(&f.source.cache_key(ObjectType::Fields)).unwrap();
        assert_eq!(entry.value, json!([]));
    }

    #[tokio::test]
    async fn records_are_keyed_by_id_and_cached() {
        let f = fixture(FakeDatastore::new(3));

        let records = f.source.get_records().await;
        let again = f.source.get_records().await;

        let ids: Vec<_> = records.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(records["2"]["year"], json!(2001));
        assert_eq!(records["3"]["value"], json!(20));
        assert_eq!(records, again);

        // one schema call, one records page
        assert_eq!(f.client.calls().len(), 2);
    }

    #[tokio::test]
    async fn records_only_copy_known_fields() {
        let f = fixture(FakeDatastore::new(0));
        let fields = json!([{"id": "_id"}, {"id": "year"}]);
        let rows = json!([
            {"_id": "a", "year": 2019, "extra": "dropped"},
            {"_id": "b"},
            {"year": 2021},
            {"other": 1}
        ]);
        let ttl = Duration::from_secs(60);
        f.cache.set(&f.source.cache_key(ObjectType::Fields), fields, ttl);
        f.cache.set(&f.source.cache_key(ObjectType::Records), rows, ttl);

        let records = f.source.get_records().await;

        assert!(f.client.calls().is_empty());
        let ids: Vec<_> = records.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["a", "b", "2"]);
        assert_eq!(records["a"], serde_json::from_value::<Record>(json!({"_id": "a", "year": 2019})).unwrap());
        assert_eq!(records["b"].len(), 1);
        assert_eq!(records["2"]["year"], json!(2021));
    }

    #[tokio::test]
    async fn rows_without_id_never_replace_keyed_rows() {
        let f = fixture(FakeDatastore::new(0));
        let fields = json!([{"id": "_id"}, {"id": "year"}]);
        let rows = json!([
            {"_id": "1", "year": 2019},
            {"year": 2020},
            {"_id": "1-1", "year": 2021},
            {"year": 2022}
        ]);
        let ttl = Duration::from_secs(60);
        f.cache.set(&f.source.cache_key(ObjectType::Fields), fields, ttl);
        f.cache.set(&f.source.cache_key(ObjectType::Records), rows, ttl);

        let records = f.source.get_records().await;

        assert_eq!(records.len(), 4);
        assert_eq!(records["1"]["year"], json!(2019));
        assert_eq!(records["1-1"]["year"], json!(2021));
        let mut years: Vec<_> = records.values().filter_map(|r| r["year"].as_i64()).collect();
        years.sort_unstable();
        assert_eq!(years, vec![2019, 2020, 2021, 2022]);
    }

    #[tokio::test]
    async fn zero_expiry_disables_caching() {
        let f = fixture_with(FakeDatastore::new(2), Some(0), DataFilters::default());

        f.source.get_fields().await;
        f.source.get_fields().await;

        assert_eq!(f.client.calls().len(), 2);
        assert!(f.cache.is_empty());
    }

    #[tokio::test]
    async fn data_filters_are_forwarded() {
        let filters = DataFilters::from_config(Some(" storm "), Some(r#"{"region": "north"}"#));
        let f = fixture_with(FakeDatastore::new(2), None, filters);

        f.source.get_records().await;

        for call in f.client.calls() {
            assert_eq!(call.id, "res-1");
            assert_eq!(call.q.as_deref(), Some("storm"));
            assert_eq!(call.filters.as_ref().unwrap()["region"], json!("north"));
        }
    }

    #[test]
    fn cache_keys_depend_on_object_type() {
        let f = fixture(FakeDatastore::new(0));

        assert_eq!(
            f.source.cache_key(ObjectType::Fields),
            cache_key("ckan", "res-1", "fields")
        );
        assert_ne!(
            f.source.cache_key(ObjectType::Fields),
            f.source.cache_key(ObjectType::Records)
        );
    }

    #[test]
    fn rejects_invalid_resource_uri() {
        let config = SourceConfig {
            plugin: PLUGIN_KEY.to_string(),
            uri: "not a uri".to_string(),
            cache_expiry: None,
        };
        let result = CkanSource::new(
            &config,
            &Settings::default(),
            DataFilters::default(),
            Arc::new(MemoryCacheStore::new()),
            Arc::new(FakeDatastore::new(0)),
        );

        assert!(matches!(result, Err(SourceError::InvalidResource(_))));
    }

    #[test]
    fn configuration_form_describes_source_settings() {
        let f = fixture_with(FakeDatastore::new(0), Some(1800), DataFilters::default());

        let form = f.source.configuration_form();
        let expiry = form.get("source.cacheExpiry").unwrap();

        assert_eq!(expiry.default, json!("1800"));
        assert_eq!(expiry.options.len(), 9);
        assert_eq!(
            form.get("source.uri").unwrap().default,
            json!("https://demo.ckan.org/dataset/rain/resource/res-1")
        );
    }
}
