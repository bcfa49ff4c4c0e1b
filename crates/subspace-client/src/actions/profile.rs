//! Profile fetches and mutations.

use subspace_remote::ProfileUpdate;
use subspace_shared::types::WalletAddress;
use subspace_store::models::Profile;
use subspace_store::GuardKind;

use crate::client::Client;

impl Client {
    /// Fetch a profile by address, serving from cache unless `force`.
    ///
    /// Cache-or-skip: when another fetch for the same address is already in
    /// flight, the cached value (possibly absent) is returned instead of
    /// waiting.
    pub async fn fetch_profile(&self, address: &WalletAddress, force: bool) -> Option<Profile> {
        if !force {
            if let Some(profile) = self.cache().profile(address) {
                return Some(profile);
            }
        }

        let Some(_guard) = self
            .cache()
            .guards()
            .try_acquire(GuardKind::Profile, address.as_str())
        else {
            return self.cache().profile(address);
        };

        match self.remote().get_profile(address).await {
            Ok(profile) => {
                self.cache().put_profile(profile.clone());
                Some(profile)
            }
            Err(e) => {
                tracing::warn!(address = address.short(), error = %e, "profile fetch failed");
                None
            }
        }
    }

    /// Forced fetch of the bound identity's own profile.
    ///
    /// On success the profile becomes the cache's own-profile entry and the
    /// sequential joined-server walk is (re)started from the fresh snapshot.
    pub async fn fetch_own_profile(&self) -> Option<Profile> {
        let identity = self.identity()?;

        let Some(_guard) = self
            .cache()
            .guards()
            .try_acquire(GuardKind::Profile, identity.address.as_str())
        else {
            return self.cache().own_profile();
        };

        match self.remote().get_profile(&identity.address).await {
            Ok(profile) => {
                self.cache().set_own_profile(profile.clone());
                self.spawn_server_walk(&profile);
                Some(profile)
            }
            Err(e) => {
                tracing::warn!(
                    address = identity.address.short(),
                    error = %e,
                    "own profile fetch failed"
                );
                None
            }
        }
    }

    /// Create the bound identity's profile on the remote service.
    ///
    /// Creation returns the stored entity, which seeds the cache directly;
    /// a settle refetch follows anyway to pick up remote-side defaults.
    pub async fn create_profile(&self, update: ProfileUpdate) -> bool {
        if !self.is_bound() {
            return false;
        }

        match self.remote().create_profile(update).await {
            Ok(profile) => {
                self.cache().set_own_profile(profile);
                self.schedule_profile_refetch();
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "profile creation failed");
                false
            }
        }
    }

    /// Update the bound identity's profile.
    pub async fn update_profile(&self, update: ProfileUpdate) -> bool {
        if !self.is_bound() {
            return false;
        }

        match self.remote().update_profile(update).await {
            Ok(()) => {
                self.schedule_profile_refetch();
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "profile update failed");
                false
            }
        }
    }

    /// Schedule a delayed forced refetch of the own profile, giving the
    /// remote service time to settle.
    pub(crate) fn schedule_profile_refetch(&self) {
        let client = self.clone();
        let generation = self.generation();
        let delay = self.config().structural_refetch_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !client.generation_is(generation) {
                return;
            }
            client.fetch_own_profile().await;
        });
    }
}
