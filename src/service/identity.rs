use crate::AppContext;
use crate::error::app_error::AppError;
use crate::models::profile::{Identity, Profile};
use crate::models::role::Role;
use crate::models::session::Session;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Use the cached profile id when one is stored.
    #[default]
    PreferCache,
    /// Always fetch the profile collection and re-match.
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub identity: Identity,
    /// Present only when the collection was fetched for this resolution.
    pub profile: Option<Profile>,
}

/// First profile whose email matches `email` case-insensitively.
///
/// Email uniqueness is assumed, not checked by the backend. When several
/// records match, the first one still wins and the duplicates are logged.
pub fn match_profile<'p>(profiles: &'p [Profile], email: &str) -> Option<&'p Profile> {
    let mut matches = profiles.iter().filter(|p| p.matches_email(email));
    let first = matches.next()?;
    let duplicates = matches.count();
    if duplicates > 0 {
        warn!(profile_id = %first.id, duplicates, "several profiles share the login email");
    }
    Some(first)
}

pub struct IdentityResolver<'a> {
    ctx: &'a AppContext,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        IdentityResolver { ctx }
    }

    /// Bridges a session to the profile it belongs to. The matched id is
    /// cached both in the store and on `session`, which is the only place a
    /// cached id is read from.
    pub async fn resolve(&self, session: &mut Session, policy: CachePolicy) -> Result<ResolvedIdentity, AppError> {
        let role = session.role;
        let Some(email) = session.login_email.clone() else {
            warn!(role = %role, "session has no login email to match");
            return Err(AppError::NotLoggedIn);
        };

        if policy == CachePolicy::PreferCache
            && let Some(id) = session.cached_profile_id()
        {
            debug!(role = %role, profile_id = %id, "identity served from cache");
            return Ok(ResolvedIdentity {
                identity: Identity {
                    id: id.to_string(),
                    email,
                    role,
                },
                profile: None,
            });
        }

        let profiles = self.fetch_profiles(role, &session.token).await?;
        let profile = match_profile(&profiles, &email)
            .cloned()
            .ok_or(AppError::ProfileNotFound(email))?;

        self.ctx.sessions.cache_profile_id(role, &profile.id).await?;
        session.set_cached_profile_id(&profile.id);
        info!(role = %role, profile_id = %profile.id, scanned = profiles.len(), "identity resolved");

        Ok(ResolvedIdentity {
            identity: Identity::from(&profile),
            profile: Some(profile),
        })
    }

    /// Fetches and normalizes the whole collection. Records that cannot be
    /// normalized are skipped and logged, never defaulted.
    pub async fn fetch_profiles(&self, role: Role, token: &str) -> Result<Vec<Profile>, AppError> {
        let records = self.ctx.api.list_profiles(role, token).await?;
        let total = records.len();

        let profiles: Vec<Profile> = records
            .into_iter()
            .filter_map(|record| match Profile::from_value(role, record) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    warn!(role = %role, error = %e, "skipping malformed profile record");
                    None
                }
            })
            .collect();

        if profiles.len() != total {
            warn!(role = %role, total, usable = profiles.len(), "profile collection contained malformed records");
        }
        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StorageKey;
    use crate::test_utils::{MockApi, buyer_profiles, context_with};
    use proptest::prelude::*;
    use serde_json::json;

    fn session(email: &str) -> Session {
        let mut session = Session::new("T", Role::Buyer);
        session.login_email = Some(email.to_string());
        session
    }

    fn profile(id: &str, email: &str) -> Profile {
        Profile::from_value(Role::Buyer, json!({"_id": id, "Email": email})).unwrap()
    }

    #[tokio::test]
    async fn matches_case_insensitively_and_caches() {
        let api = MockApi::default().with_profiles(Role::Buyer, buyer_profiles());
        let (ctx, memory, _) = context_with(api);

        let mut buyer = session("a@b.com");
        let resolved = IdentityResolver::new(&ctx).resolve(&mut buyer, CachePolicy::Refresh).await.unwrap();

        assert_eq!(resolved.identity.id, "p1");
        assert_eq!(buyer.cached_profile_id(), Some("p1"));
        assert_eq!(resolved.profile.as_ref().and_then(|p| p.name.as_deref()), Some("Asha"));
        assert_eq!(memory.snapshot().await.get(&StorageKey::BuyerId).map(String::as_str), Some("p1"));
    }

    #[tokio::test]
    async fn resolving_twice_yields_same_id() {
        let api = MockApi::default().with_profiles(Role::Buyer, buyer_profiles());
        let (ctx, _, _) = context_with(api);
        let resolver = IdentityResolver::new(&ctx);

        let first = resolver.resolve(&mut session("a@b.com"), CachePolicy::Refresh).await.unwrap();
        let second = resolver.resolve(&mut session("a@b.com"), CachePolicy::Refresh).await.unwrap();
        assert_eq!(first.identity.id, second.identity.id);
    }

    #[tokio::test]
    async fn cached_id_short_circuits_fetch() {
        let api = MockApi::default().with_profiles(Role::Buyer, buyer_profiles());
        let (ctx, _, api) = context_with(api);
        let resolver = IdentityResolver::new(&ctx);

        let mut buyer = session("a@b.com");
        resolver.resolve(&mut buyer, CachePolicy::PreferCache).await.unwrap();
        let cached = resolver.resolve(&mut buyer, CachePolicy::PreferCache).await.unwrap();

        assert_eq!(cached.identity.id, "p1");
        assert!(cached.profile.is_none());
        assert_eq!(api.calls().await, vec!["list_profiles:buyer".to_string()]);
    }

    #[tokio::test]
    async fn reloaded_session_carries_cached_id() {
        let api = MockApi::default().with_profiles(Role::Buyer, buyer_profiles());
        let (ctx, _, api) = context_with(api);
        ctx.sessions.begin(&session("a@b.com")).await.unwrap();
        let resolver = IdentityResolver::new(&ctx);

        let mut first = ctx.sessions.load(Role::Buyer).await.unwrap().expect("session");
        resolver.resolve(&mut first, CachePolicy::PreferCache).await.unwrap();

        let mut reloaded = ctx.sessions.load(Role::Buyer).await.unwrap().expect("session");
        assert_eq!(reloaded.buyer_id.as_deref(), Some("p1"));
        let cached = resolver.resolve(&mut reloaded, CachePolicy::PreferCache).await.unwrap();
        assert_eq!(cached.identity.id, "p1");
        assert_eq!(api.calls().await, vec!["list_profiles:buyer".to_string()]);
    }

    #[tokio::test]
    async fn refresh_ignores_cached_id() {
        let api = MockApi::default().with_profiles(Role::Buyer, buyer_profiles());
        let (ctx, _, api) = context_with(api);
        let mut buyer = session("a@b.com");
        buyer.buyer_id = Some("stale".to_string());

        let resolved = IdentityResolver::new(&ctx).resolve(&mut buyer, CachePolicy::Refresh).await.unwrap();
        assert_eq!(resolved.identity.id, "p1");
        assert_eq!(buyer.buyer_id.as_deref(), Some("p1"));
        assert_eq!(api.calls().await.len(), 1);
    }

    #[tokio::test]
    async fn unknown_email_is_profile_not_found() {
        let api = MockApi::default().with_profiles(Role::Buyer, buyer_profiles());
        let (ctx, memory, _) = context_with(api);

        let err = IdentityResolver::new(&ctx)
            .resolve(&mut session("nobody@b.com"), CachePolicy::Refresh)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ProfileNotFound(email) if email == "nobody@b.com"));
        assert!(memory.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_records_are_skipped() {
        let api = MockApi::default().with_profiles(
            Role::Farmer,
            vec![
                json!({"Name": "No id", "Email": "x@y.com"}),
                json!({"_id": "f0", "id": "f0", "Email": "x@y.com"}),
                json!({"_id": "f2", "Email": "other@y.com", "isVerified": "true"}),
                json!({"id": "f1", "email": "x@y.com"}),
            ],
        );
        let (ctx, _, _) = context_with(api);
        let mut farmer = Session::new("T", Role::Farmer);
        farmer.login_email = Some("X@Y.com".to_string());

        let resolved = IdentityResolver::new(&ctx).resolve(&mut farmer, CachePolicy::PreferCache).await.unwrap();
        assert_eq!(resolved.identity.id, "f1");
    }

    #[tokio::test]
    async fn session_without_email_cannot_resolve() {
        let (ctx, _, api) = context_with(MockApi::default());
        let err = IdentityResolver::new(&ctx)
            .resolve(&mut Session::new("T", Role::Buyer), CachePolicy::Refresh)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotLoggedIn));
        assert!(api.calls().await.is_empty());
    }

    #[test]
    fn first_match_wins_on_duplicates() {
        let profiles = vec![profile("p1", "dup@b.com"), profile("p2", "DUP@b.com")];
        assert_eq!(match_profile(&profiles, "dup@b.com").map(|p| p.id.as_str()), Some("p1"));
    }

    proptest! {
        #[test]
        fn match_ignores_email_case(local in "[a-z]{1,12}", domain in "[a-z]{1,8}", flips in proptest::collection::vec(any::<bool>(), 21)) {
            let email = format!("{}@{}.com", local, domain);
            let mixed: String = email
                .chars()
                .zip(flips.iter().cycle())
                .map(|(c, flip)| if *flip { c.to_ascii_uppercase() } else { c })
                .collect();
            let profiles = vec![profile("other", "someone@else.org"), profile("me", &mixed)];
            prop_assert_eq!(match_profile(&profiles, &email).map(|p| p.id.clone()), Some("me".to_string()));
        }

        #[test]
        fn no_match_without_equal_email(local in "[a-z]{1,12}") {
            let stored = format!("{}@one.com", local);
            let typed = format!("{}@two.com", local);
            let profiles = vec![profile("p1", &stored)];
            prop_assert!(match_profile(&profiles, &typed).is_none());
        }
    }
}
