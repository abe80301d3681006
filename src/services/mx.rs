//! MX-record deliverability check.

use futures_util::future::BoxFuture;
use hickory_resolver::error::ResolveError;
use hickory_resolver::TokioAsyncResolver;
use log::warn;
use moka::sync::Cache;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Resolves whether a domain advertises a mail exchanger.
pub trait MxLookup: Send + Sync {
    fn has_mx<'a>(&'a self, domain: &'a str) -> BoxFuture<'a, bool>;
}

/// The domain part of an address, if there is one.
pub fn email_domain(email: &str) -> Option<&str> {
    match email.rsplit_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Some(domain),
        _ => None,
    }
}

/// `false` for malformed addresses and for any resolver failure.
pub async fn mx_exists(lookup: &dyn MxLookup, email: &str) -> bool {
    match email_domain(email) {
        Some(domain) => lookup.has_mx(&domain.to_ascii_lowercase()).await,
        None => false,
    }
}

pub struct DnsMxLookup {
    resolver: TokioAsyncResolver,
    cache: Cache<String, bool>,
}

impl DnsMxLookup {
    pub fn from_system_conf() -> Result<Self, hickory_resolver::error::ResolveError> {
        Ok(DnsMxLookup {
            resolver: TokioAsyncResolver::tokio_from_system_conf()?,
            cache: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(Duration::from_secs(600))
                .build(),
        })
    }
}

impl MxLookup for DnsMxLookup {
    fn has_mx<'a>(&'a self, domain: &'a str) -> BoxFuture<'a, bool> {
        Box::pin(cached(&self.cache, domain, async move {
            let lookup = self.resolver.mx_lookup(domain).await?;
            Ok::<_, ResolveError>(lookup.iter().any(|mx| !mx.exchange().is_root()))
        }))
    }
}

/// Answers from the cache, or runs `lookup` and remembers its answer. Failed lookups
/// count as `false` but are not cached.
async fn cached<F, E>(cache: &Cache<String, bool>, domain: &str, lookup: F) -> bool
where
    F: Future<Output = Result<bool, E>>,
    E: fmt::Display,
{
    if let Some(exists) = cache.get(domain) {
        return exists;
    }

    match lookup.await {
        Ok(exists) => {
            cache.insert(domain.to_string(), exists);
            exists
        }
        Err(e) => {
            warn!("mail.mx.lookup.failed domain={} {}", domain, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OnlyExampleOrg;

    impl MxLookup for OnlyExampleOrg {
        fn has_mx<'a>(&'a self, domain: &'a str) -> BoxFuture<'a, bool> {
            Box::pin(async move { domain == "example.org" })
        }
    }

    #[test]
    fn domain_extraction() {
        assert_eq!(email_domain("rider@example.org"), Some("example.org"));
        assert_eq!(email_domain("odd@name@example.org"), Some("example.org"));
        assert_eq!(email_domain("no-at-sign"), None);
        assert_eq!(email_domain("@example.org"), None);
        assert_eq!(email_domain("rider@"), None);
    }

    #[actix_web::test]
    async fn failed_lookups_are_retried() {
        let cache = Cache::new(16);

        let first = cached(&cache, "example.org", async { Err::<bool, _>("timed out") }).await;
        assert!(!first);
        assert!(cache.get("example.org").is_none());

        let second = cached(&cache, "example.org", async { Ok::<_, &str>(true) }).await;
        assert!(second);

        let third = cached(&cache, "example.org", async { Ok::<_, &str>(false) }).await;
        assert!(third, "a successful answer is served from the cache");
    }

    #[actix_web::test]
    async fn mx_exists_normalizes_and_rejects_malformed() {
        assert!(mx_exists(&OnlyExampleOrg, "rider@Example.ORG").await);
        assert!(!mx_exists(&OnlyExampleOrg, "rider@example.com").await);
        assert!(!mx_exists(&OnlyExampleOrg, "rider").await);
    }
}
