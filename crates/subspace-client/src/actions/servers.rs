//! Server fetches and structural mutations.
//!
//! Structural writes (channels, categories, roles, members) all end in
//! [`Client::schedule_server_refetch`]: the remote write's return value is
//! never merged into the cache, the delayed forced refetch is the source of
//! truth.

use subspace_remote::{
    CreateCategory, CreateChannel, CreateRole, CreateServer, UpdateCategory, UpdateChannel,
    UpdateMember, UpdateRole, UpdateServer,
};
use subspace_shared::types::{CategoryId, ChannelId, RoleId, ServerId, WalletAddress};
use subspace_store::models::{Member, MemberLoadState, Server};
use subspace_store::GuardKind;

use crate::client::Client;

/// Result of the create-server compound flow. Creation and the follow-up
/// join are independent remote writes, so one can succeed without the
/// other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateServerOutcome {
    /// Id of the created server, if creation succeeded.
    pub server_id: Option<ServerId>,
    /// Whether the bound identity joined the created server.
    pub joined: bool,
}

impl CreateServerOutcome {
    pub fn failed() -> Self {
        Self {
            server_id: None,
            joined: false,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.server_id.is_some() && self.joined
    }
}

impl Client {
    /// Fetch a server by id, serving from cache unless `force`.
    ///
    /// Cache-or-skip: when another fetch for the same id is already in
    /// flight, the cached value (possibly absent) is returned instead of
    /// waiting.
    pub async fn fetch_server(&self, id: &ServerId, force: bool) -> Option<Server> {
        if !force {
            if let Some(server) = self.cache().server(id) {
                return Some(server);
            }
        }

        let Some(_guard) = self
            .cache()
            .guards()
            .try_acquire(GuardKind::Server, id.as_str())
        else {
            return self.cache().server(id);
        };

        match self.remote().get_server(id).await {
            Ok(incoming) => {
                self.cache().merge_server(incoming);
                self.cache().server(id)
            }
            Err(e) => {
                tracing::warn!(server = %id, error = %e, "server fetch failed");
                None
            }
        }
    }

    /// Fetch a server's member list out-of-band.
    ///
    /// The list attaches to the cached server entry and survives subsequent
    /// unrelated server refreshes.
    pub async fn fetch_members(&self, id: &ServerId) -> Option<Vec<Member>> {
        let guard_key = format!("{id}#members");
        let Some(_guard) = self.cache().guards().try_acquire(GuardKind::Server, guard_key) else {
            return self.cache().server(id).and_then(|server| server.members);
        };

        self.cache().set_member_state(id, MemberLoadState::Loading);

        match self.remote().list_members(id).await {
            Ok(members) => {
                self.cache().attach_members(id, members.clone());
                Some(members)
            }
            Err(e) => {
                tracing::warn!(server = %id, error = %e, "member fetch failed");
                self.cache().set_member_state(id, MemberLoadState::NotLoaded);
                None
            }
        }
    }

    /// Create a server, join it, and schedule a profile refetch so the new
    /// joined-server entry appears. Each step is an independent write;
    /// partial failure is reported in the outcome, with the cache in a
    /// valid intermediate state.
    pub async fn create_server(&self, create: CreateServer) -> CreateServerOutcome {
        if !self.is_bound() {
            return CreateServerOutcome::failed();
        }

        let server_id = match self.remote().create_server(create).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "server creation failed");
                return CreateServerOutcome::failed();
            }
        };

        let joined = match self.remote().join_server(&server_id).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(server = %server_id, error = %e, "join after creation failed");
                false
            }
        };

        self.schedule_server_refetch(&server_id);
        if joined {
            self.schedule_profile_refetch();
        }

        CreateServerOutcome {
            server_id: Some(server_id),
            joined,
        }
    }

    pub async fn update_server(&self, id: &ServerId, update: UpdateServer) -> bool {
        if !self.is_bound() {
            return false;
        }
        self.structural_result(id, "server update", self.remote().update_server(id, update).await)
    }

    pub async fn join_server(&self, id: &ServerId) -> bool {
        if !self.is_bound() {
            return false;
        }
        match self.remote().join_server(id).await {
            Ok(()) => {
                self.schedule_server_refetch(id);
                self.schedule_profile_refetch();
                true
            }
            Err(e) => {
                tracing::warn!(server = %id, error = %e, "join failed");
                false
            }
        }
    }

    pub async fn leave_server(&self, id: &ServerId) -> bool {
        if !self.is_bound() {
            return false;
        }
        match self.remote().leave_server(id).await {
            Ok(()) => {
                self.schedule_profile_refetch();
                true
            }
            Err(e) => {
                tracing::warn!(server = %id, error = %e, "leave failed");
                false
            }
        }
    }

    // -- Channels -----------------------------------------------------------

    pub async fn create_channel(&self, server: &ServerId, create: CreateChannel) -> bool {
        if !self.is_bound() {
            return false;
        }
        self.structural_result(
            server,
            "channel creation",
            self.remote().create_channel(server, create).await,
        )
    }

    pub async fn update_channel(
        &self,
        server: &ServerId,
        channel: &ChannelId,
        update: UpdateChannel,
    ) -> bool {
        if !self.is_bound() {
            return false;
        }
        self.structural_result(
            server,
            "channel update",
            self.remote().update_channel(server, channel, update).await,
        )
    }

    pub async fn delete_channel(&self, server: &ServerId, channel: &ChannelId) -> bool {
        if !self.is_bound() {
            return false;
        }
        self.structural_result(
            server,
            "channel deletion",
            self.remote().delete_channel(server, channel).await,
        )
    }

    // -- Categories ---------------------------------------------------------

    pub async fn create_category(&self, server: &ServerId, create: CreateCategory) -> bool {
        if !self.is_bound() {
            return false;
        }
        self.structural_result(
            server,
            "category creation",
            self.remote().create_category(server, create).await,
        )
    }

    pub async fn update_category(
        &self,
        server: &ServerId,
        category: &CategoryId,
        update: UpdateCategory,
    ) -> bool {
        if !self.is_bound() {
            return false;
        }
        self.structural_result(
            server,
            "category update",
            self.remote().update_category(server, category, update).await,
        )
    }

    pub async fn delete_category(&self, server: &ServerId, category: &CategoryId) -> bool {
        if !self.is_bound() {
            return false;
        }
        self.structural_result(
            server,
            "category deletion",
            self.remote().delete_category(server, category).await,
        )
    }

    // -- Roles --------------------------------------------------------------

    pub async fn create_role(&self, server: &ServerId, create: CreateRole) -> bool {
        if !self.is_bound() {
            return false;
        }
        self.structural_result(
            server,
            "role creation",
            self.remote().create_role(server, create).await,
        )
    }

    pub async fn update_role(&self, server: &ServerId, role: &RoleId, update: UpdateRole) -> bool {
        if !self.is_bound() {
            return false;
        }
        self.structural_result(
            server,
            "role update",
            self.remote().update_role(server, role, update).await,
        )
    }

    pub async fn delete_role(&self, server: &ServerId, role: &RoleId) -> bool {
        if !self.is_bound() {
            return false;
        }
        self.structural_result(
            server,
            "role deletion",
            self.remote().delete_role(server, role).await,
        )
    }

    /// Move a role to an absolute position. No optimistic patch: the remote
    /// service renumbers neighbors, so the resulting order cannot be
    /// predicted client-side.
    pub async fn reorder_role(&self, server: &ServerId, role: &RoleId, position: i64) -> bool {
        let update = UpdateRole {
            position: Some(position),
            ..Default::default()
        };
        self.update_role(server, role, update).await
    }

    /// Move a role directly above another role.
    pub async fn move_role_above(&self, server: &ServerId, role: &RoleId, anchor: &RoleId) -> bool {
        match self.cached_role_position(server, anchor) {
            Some(position) => self.reorder_role(server, role, position).await,
            None => false,
        }
    }

    /// Move a role directly below another role.
    pub async fn move_role_below(&self, server: &ServerId, role: &RoleId, anchor: &RoleId) -> bool {
        match self.cached_role_position(server, anchor) {
            Some(position) => self.reorder_role(server, role, position + 1).await,
            None => false,
        }
    }

    fn cached_role_position(&self, server: &ServerId, role: &RoleId) -> Option<i64> {
        self.cache()
            .server(server)?
            .roles
            .iter()
            .find(|r| r.id == *role)
            .map(|r| r.position)
    }

    // -- Members ------------------------------------------------------------

    pub async fn update_member(
        &self,
        server: &ServerId,
        member: &WalletAddress,
        update: UpdateMember,
    ) -> bool {
        if !self.is_bound() {
            return false;
        }
        self.structural_result(
            server,
            "member update",
            self.remote().update_member(server, member, update).await,
        )
    }

    // -- Helpers ------------------------------------------------------------

    fn structural_result(
        &self,
        server: &ServerId,
        what: &str,
        result: subspace_remote::Result<()>,
    ) -> bool {
        match result {
            Ok(()) => {
                self.schedule_server_refetch(server);
                true
            }
            Err(e) => {
                tracing::warn!(server = %server, error = %e, "{what} failed");
                false
            }
        }
    }

    /// Schedule a delayed forced refetch of a server, giving the remote
    /// service time to settle.
    pub(crate) fn schedule_server_refetch(&self, id: &ServerId) {
        let client = self.clone();
        let id = id.clone();
        let generation = self.generation();
        let delay = self.config().structural_refetch_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !client.generation_is(generation) {
                return;
            }
            client.fetch_server(&id, true).await;
        });
    }
}
