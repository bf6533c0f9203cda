// src/services/shortener.rs - Business logic
use std::sync::Arc;

use futures::FutureExt;
use log::{info, warn};
use url::Url;
use validator::Validate;

use crate::config::ShortenerConfig;
use crate::errors::{ShortenerError, StorageError};
use crate::models::{ShortenRequestDto, ShortenResponseDto};
use crate::storage::{CreateOutcome, LinkStore};
use crate::utils::code_generator::{self, GenerateError};
use crate::utils::link::{build_short_url, ensure_utm_campaign, normalize_code, strip_crlf};
use crate::utils::retry;

/// Insert retries after a generation race lost to a concurrent writer
const MAX_INSERT_ATTEMPTS: usize = 3;

type Result<T> = std::result::Result<T, ShortenerError>;

/// Outcome of one attempt against a single backend. Storage failures demote
/// the request to the fallback backend; terminal errors go straight to the
/// caller.
enum AttemptError {
    Terminal(ShortenerError),
    Storage(StorageError),
}

impl From<StorageError> for AttemptError {
    fn from(err: StorageError) -> Self {
        AttemptError::Storage(err)
    }
}

impl AttemptError {
    /// Collapses the error once no further backend is left to try.
    fn surface(self) -> ShortenerError {
        match self {
            AttemptError::Terminal(err) => err,
            AttemptError::Storage(err) => {
                warn!("Last storage backend failed: {}", err);
                ShortenerError::StorageUnavailable
            }
        }
    }
}

/// Orchestrates shortening and resolution over the injected backends.
///
/// The primary (relational) store is optional; the JSON file store is always
/// present as the degrade-gracefully path.
pub struct ShortenerService {
    primary: Option<Arc<dyn LinkStore>>,
    fallback: Arc<dyn LinkStore>,
    config: ShortenerConfig,
}

impl ShortenerService {
    pub fn new(
        primary: Option<Arc<dyn LinkStore>>,
        fallback: Arc<dyn LinkStore>,
        config: ShortenerConfig,
    ) -> Self {
        Self {
            primary,
            fallback,
            config,
        }
    }

    /// Creates a short link for a validated request.
    pub async fn shorten(&self, dto: ShortenRequestDto) -> Result<ShortenResponseDto> {
        if let Err(errors) = dto.validate() {
            return Err(validation_error(&errors));
        }

        // The DTO validator already guarantees an absolute http/https URL
        let parsed = Url::parse(&dto.url)
            .map_err(|_| ShortenerError::InvalidUrl("Invalid URL format".to_string()))?;
        if self.config.enforce_https && parsed.scheme() != "https" {
            return Err(ShortenerError::HttpsRequired);
        }

        // Aliases are user intent: normalized to lowercase and bounded by
        // the configured maximum, never silently replaced
        let alias = match dto.alias.as_deref() {
            Some(alias) => {
                let alias = alias.to_lowercase();
                if alias.len() > self.config.max_length {
                    return Err(ShortenerError::InvalidAlias(format!(
                        "Alias must be at most {} characters",
                        self.config.max_length
                    )));
                }
                Some(alias)
            }
            None => None,
        };

        let target_url = match &self.config.utm_campaign {
            Some(campaign) => ensure_utm_campaign(&dto.url, campaign),
            None => dto.url.clone(),
        };

        let code = match &self.primary {
            Some(primary) => {
                match self
                    .shorten_on(primary.as_ref(), &target_url, alias.as_deref())
                    .await
                {
                    Ok(code) => code,
                    Err(AttemptError::Terminal(err)) => return Err(err),
                    Err(AttemptError::Storage(err)) => {
                        warn!("Primary store failed, falling back to JSON store: {}", err);
                        self.shorten_on(self.fallback.as_ref(), &target_url, alias.as_deref())
                            .await
                            .map_err(AttemptError::surface)?
                    }
                }
            }
            None => self
                .shorten_on(self.fallback.as_ref(), &target_url, alias.as_deref())
                .await
                .map_err(AttemptError::surface)?,
        };

        info!("Created short link '{}' -> {}", code, target_url);

        let short_url = build_short_url(&self.config.base_url, &code);
        Ok(ShortenResponseDto::new(code, short_url))
    }

    /// Resolves a raw code to its stored target URL.
    ///
    /// Misses are a normal outcome: storage errors are logged, never
    /// surfaced, and the caller only ever sees `NotFound`.
    pub async fn resolve(&self, raw_code: &str) -> Result<String> {
        let code = normalize_code(raw_code);
        if code.is_empty() {
            return Err(ShortenerError::NotFound);
        }

        let primary_hit = match &self.primary {
            Some(primary) => match primary.lookup(&code).await {
                Ok(Some(link)) => Some((primary.as_ref(), link)),
                Ok(None) => None,
                Err(err) => {
                    warn!("Primary lookup failed for '{}': {}", code, err);
                    None
                }
            },
            None => None,
        };

        let (store, link) = match primary_hit {
            Some(hit) => hit,
            None => match self.fallback.lookup(&code).await {
                Ok(Some(link)) => (self.fallback.as_ref(), link),
                Ok(None) => return Err(ShortenerError::NotFound),
                Err(err) => {
                    warn!("Fallback lookup failed for '{}': {}", code, err);
                    return Err(ShortenerError::NotFound);
                }
            },
        };

        // A failed counter update never fails the redirect
        if let Err(err) = store.record_hit(&code).await {
            warn!("Hit counter update failed for '{}': {}", code, err);
        }

        Ok(strip_crlf(&link.target_url))
    }

    /// Retention sweep over every configured backend. Failures are logged;
    /// one backend failing does not stop the other's sweep.
    pub async fn purge_expired(&self) -> u64 {
        let days = self.config.auto_purge_days;
        if days == 0 {
            return 0;
        }

        let mut purged = 0;
        if let Some(primary) = &self.primary {
            match primary.purge_older_than(days).await {
                Ok(count) => purged += count,
                Err(err) => warn!("Primary purge failed: {}", err),
            }
        }
        match self.fallback.purge_older_than(days).await {
            Ok(count) => purged += count,
            Err(err) => warn!("Fallback purge failed: {}", err),
        }

        purged
    }

    /// One shorten attempt against a single backend.
    async fn shorten_on(
        &self,
        store: &dyn LinkStore,
        target_url: &str,
        alias: Option<&str>,
    ) -> std::result::Result<String, AttemptError> {
        // Opportunistic retention sweep on the backend taking the write
        if self.config.auto_purge_days > 0 {
            store.purge_older_than(self.config.auto_purge_days).await?;
        }

        match alias {
            Some(alias) => match store.create(alias, target_url).await? {
                CreateOutcome::Created => Ok(alias.to_string()),
                CreateOutcome::Duplicate => Err(AttemptError::Terminal(ShortenerError::AliasTaken)),
            },
            None => self.insert_generated(store, target_url).await,
        }
    }

    /// Generates a code and inserts it, regenerating on insert collisions.
    async fn insert_generated(
        &self,
        store: &dyn LinkStore,
        target_url: &str,
    ) -> std::result::Result<String, AttemptError> {
        let max_length = self.config.max_length;

        let inserted = retry::bounded(MAX_INSERT_ATTEMPTS, |_| async move {
            let code = code_generator::generate_unique_code(
                |candidate| async move { store.exists(&candidate).await }.boxed(),
                max_length,
            )
            .await?;

            // Duplicate here means the uniqueness check raced a concurrent
            // writer; the retry loop regenerates from scratch.
            match store
                .create(&code, target_url)
                .await
                .map_err(GenerateError::Storage)?
            {
                CreateOutcome::Created => Ok(Some(code)),
                CreateOutcome::Duplicate => Ok(None),
            }
        })
        .await
        .map_err(|err| match err {
            GenerateError::Exhausted(_) => {
                AttemptError::Terminal(ShortenerError::GenerationExhausted)
            }
            GenerateError::Storage(err) => AttemptError::Storage(err),
        })?;

        inserted.ok_or(AttemptError::Terminal(ShortenerError::GenerationExhausted))
    }
}

/// Maps DTO validation failures onto the service error taxonomy.
fn validation_error(errors: &validator::ValidationErrors) -> ShortenerError {
    let fields = errors.field_errors();

    if let Some(errs) = fields.get("url") {
        return ShortenerError::InvalidUrl(first_message(errs));
    }
    if let Some(errs) = fields.get("alias") {
        return ShortenerError::InvalidAlias(first_message(errs));
    }

    ShortenerError::InvalidUrl("Invalid request".to_string())
}

fn first_message(errors: &[validator::ValidationError]) -> String {
    errors
        .iter()
        .filter_map(|e| e.message.as_ref())
        .map(|m| m.to_string())
        .next()
        .unwrap_or_else(|| "Invalid value".to_string())
}

#[cfg(test)]
mod tests {
    use std::io::{Error as IoError, ErrorKind};
    use std::path::PathBuf;

    use tempfile::{tempdir, TempDir};

    use super::*;
    use crate::storage::{JsonFileStore, MockLinkStore};

    fn test_config(max_length: usize) -> ShortenerConfig {
        ShortenerConfig {
            base_url: "https://sho.rt/?s=".to_string(),
            max_length,
            enforce_https: false,
            auto_purge_days: 0,
            redirect_status: 302,
            utm_campaign: None,
            store_path: PathBuf::from("unused"),
            cors_allowed_origins: Vec::new(),
        }
    }

    fn file_backed_service(dir: &TempDir, config: ShortenerConfig) -> ShortenerService {
        let fallback = Arc::new(JsonFileStore::new(dir.path().join("short-links.json")));
        ShortenerService::new(None, fallback, config)
    }

    fn request(url: &str, alias: Option<&str>) -> ShortenRequestDto {
        ShortenRequestDto {
            url: url.to_string(),
            alias: alias.map(str::to_string),
        }
    }

    fn broken_store() -> MockLinkStore {
        let mut mock = MockLinkStore::new();
        mock.expect_create()
            .returning(|_, _| Err(IoError::new(ErrorKind::Other, "down").into()));
        mock.expect_lookup()
            .returning(|_| Err(IoError::new(ErrorKind::Other, "down").into()));
        mock.expect_exists()
            .returning(|_| Err(IoError::new(ErrorKind::Other, "down").into()));
        mock.expect_purge_older_than()
            .returning(|_| Err(IoError::new(ErrorKind::Other, "down").into()));
        mock.expect_record_hit()
            .returning(|_| Err(IoError::new(ErrorKind::Other, "down").into()));
        mock
    }

    #[tokio::test]
    async fn shorten_then_resolve_round_trips() {
        let dir = tempdir().unwrap();
        let service = file_backed_service(&dir, test_config(4));

        let created = service
            .shorten(request("https://example.com/path", None))
            .await
            .unwrap();
        assert_eq!(created.code.len(), 4);
        assert_eq!(
            created.short_url,
            format!("https://sho.rt/?s={}", created.code)
        );

        let resolved = service.resolve(&created.code).await.unwrap();
        assert_eq!(resolved, "https://example.com/path");

        // Resolution is idempotent
        let again = service.resolve(&created.code).await.unwrap();
        assert_eq!(again, resolved);
    }

    #[tokio::test]
    async fn alias_is_lowercased_and_resolvable_in_any_case() {
        let dir = tempdir().unwrap();
        let service = file_backed_service(&dir, test_config(6));

        let created = service
            .shorten(request("https://example.com", Some("Promo1")))
            .await
            .unwrap();
        assert_eq!(created.code, "promo1");

        let resolved = service.resolve("PROMO1").await.unwrap();
        assert_eq!(resolved, "https://example.com");
    }

    #[tokio::test]
    async fn alias_exceeding_configured_length_is_rejected() {
        let dir = tempdir().unwrap();
        let service = file_backed_service(&dir, test_config(4));

        let err = service
            .shorten(request("https://example.com/path", Some("demo1")))
            .await
            .unwrap_err();
        assert!(matches!(err, ShortenerError::InvalidAlias(_)));
    }

    #[tokio::test]
    async fn malformed_alias_is_rejected() {
        let dir = tempdir().unwrap();
        let service = file_backed_service(&dir, test_config(8));

        let err = service
            .shorten(request("https://example.com", Some("bad-alias")))
            .await
            .unwrap_err();
        assert!(matches!(err, ShortenerError::InvalidAlias(_)));
    }

    #[tokio::test]
    async fn occupied_alias_is_a_conflict() {
        let dir = tempdir().unwrap();
        let service = file_backed_service(&dir, test_config(4));

        service
            .shorten(request("https://example.com/one", Some("ab12")))
            .await
            .unwrap();
        let err = service
            .shorten(request("https://example.com/two", Some("ab12")))
            .await
            .unwrap_err();
        assert_eq!(err, ShortenerError::AliasTaken);
    }

    #[tokio::test]
    async fn invalid_url_is_rejected() {
        let dir = tempdir().unwrap();
        let service = file_backed_service(&dir, test_config(4));

        let err = service.shorten(request("not-a-url", None)).await.unwrap_err();
        assert!(matches!(err, ShortenerError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn plain_http_is_rejected_when_https_is_enforced() {
        let dir = tempdir().unwrap();
        let mut config = test_config(4);
        config.enforce_https = true;
        let service = file_backed_service(&dir, config);

        let err = service
            .shorten(request("http://example.com", None))
            .await
            .unwrap_err();
        assert_eq!(err, ShortenerError::HttpsRequired);
    }

    #[tokio::test]
    async fn utm_campaign_is_appended_when_configured() {
        let dir = tempdir().unwrap();
        let mut config = test_config(4);
        config.utm_campaign = Some("launch".to_string());
        let service = file_backed_service(&dir, config);

        let created = service
            .shorten(request("https://example.com/page", None))
            .await
            .unwrap();
        let resolved = service.resolve(&created.code).await.unwrap();
        assert_eq!(resolved, "https://example.com/page?utm_campaign=launch");

        // An existing campaign parameter is left alone
        let created = service
            .shorten(request("https://example.com/?utm_campaign=old", None))
            .await
            .unwrap();
        let resolved = service.resolve(&created.code).await.unwrap();
        assert_eq!(resolved, "https://example.com/?utm_campaign=old");
    }

    #[tokio::test]
    async fn unknown_code_resolves_to_not_found() {
        let dir = tempdir().unwrap();
        let service = file_backed_service(&dir, test_config(4));

        let err = service.resolve("doesnotexist").await.unwrap_err();
        assert_eq!(err, ShortenerError::NotFound);
    }

    #[tokio::test]
    async fn empty_normalized_code_skips_storage() {
        let dir = tempdir().unwrap();
        let service = file_backed_service(&dir, test_config(4));

        let err = service.resolve("!!!").await.unwrap_err();
        assert_eq!(err, ShortenerError::NotFound);
    }

    #[tokio::test]
    async fn resolve_falls_back_when_primary_is_down() {
        let dir = tempdir().unwrap();
        let fallback = Arc::new(JsonFileStore::new(dir.path().join("short-links.json")));
        fallback
            .create("xy9z", "https://foo.test")
            .await
            .unwrap();

        let service = ShortenerService::new(
            Some(Arc::new(broken_store())),
            fallback,
            test_config(4),
        );

        let resolved = service.resolve("xy9z").await.unwrap();
        assert_eq!(resolved, "https://foo.test");
    }

    #[tokio::test]
    async fn shorten_falls_back_when_primary_is_down() {
        let dir = tempdir().unwrap();
        let fallback = Arc::new(JsonFileStore::new(dir.path().join("short-links.json")));

        let service = ShortenerService::new(
            Some(Arc::new(broken_store())),
            fallback.clone(),
            test_config(4),
        );

        let created = service
            .shorten(request("https://example.com", Some("ab12")))
            .await
            .unwrap();
        assert_eq!(created.code, "ab12");
        assert!(fallback.exists("ab12").await.unwrap());
    }

    #[tokio::test]
    async fn shorten_reports_unavailable_when_all_backends_fail() {
        let service = ShortenerService::new(
            Some(Arc::new(broken_store())),
            Arc::new(broken_store()),
            test_config(4),
        );

        let err = service
            .shorten(request("https://example.com", Some("ab12")))
            .await
            .unwrap_err();
        assert_eq!(err, ShortenerError::StorageUnavailable);
    }

    #[tokio::test]
    async fn saturated_code_space_exhausts_generation() {
        let mut mock = MockLinkStore::new();
        mock.expect_exists().returning(|_| Ok(true));

        let service = ShortenerService::new(None, Arc::new(mock), test_config(4));

        let err = service
            .shorten(request("https://example.com", None))
            .await
            .unwrap_err();
        assert_eq!(err, ShortenerError::GenerationExhausted);
    }

    #[tokio::test]
    async fn stored_crlf_never_reaches_the_redirect() {
        let dir = tempdir().unwrap();
        let fallback = Arc::new(JsonFileStore::new(dir.path().join("short-links.json")));
        fallback
            .create("crlf", "https://a.test/\r\npath")
            .await
            .unwrap();

        let service = ShortenerService::new(None, fallback, test_config(4));
        let resolved = service.resolve("crlf").await.unwrap();
        assert_eq!(resolved, "https://a.test/path");
    }

    #[tokio::test]
    async fn purge_sweeps_both_backends() {
        let dir = tempdir().unwrap();
        let mut primary = MockLinkStore::new();
        primary.expect_purge_older_than().returning(|_| Ok(3));

        let fallback = Arc::new(JsonFileStore::new(dir.path().join("short-links.json")));
        let mut config = test_config(4);
        config.auto_purge_days = 30;

        let service = ShortenerService::new(Some(Arc::new(primary)), fallback, config);
        assert_eq!(service.purge_expired().await, 3);
    }
}
