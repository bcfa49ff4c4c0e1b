//! The abstract remote-service client.

use async_trait::async_trait;

use subspace_shared::types::{CategoryId, ChannelId, MessageId, RoleId, ServerId, WalletAddress};
use subspace_store::models::{Member, Message, Profile, Server};

use crate::error::Result;
use crate::requests::{
    CreateCategory, CreateChannel, CreateRole, CreateServer, ProfileUpdate, SendMessage,
    UpdateCategory, UpdateChannel, UpdateMember, UpdateRole, UpdateServer,
};

/// Asynchronous client for the remote chat backend.
///
/// Implementations own transport, signing and retry concerns; the
/// coordinator only sees this shape. Writes act on behalf of the identity
/// the implementation was constructed with.
///
/// The backend is eventually consistent: a value read immediately after a
/// successful write may predate that write. Callers refetch after a settle
/// delay instead of trusting write results.
#[async_trait]
pub trait RemoteService: Send + Sync {
    // -- Profiles -----------------------------------------------------------

    async fn get_profile(&self, address: &WalletAddress) -> Result<Profile>;

    async fn create_profile(&self, update: ProfileUpdate) -> Result<Profile>;

    async fn update_profile(&self, update: ProfileUpdate) -> Result<()>;

    // -- Servers ------------------------------------------------------------

    async fn get_server(&self, id: &ServerId) -> Result<Server>;

    /// Create a server and return its id (needed for the follow-up join;
    /// everything else is refetched).
    async fn create_server(&self, create: CreateServer) -> Result<ServerId>;

    async fn update_server(&self, id: &ServerId, update: UpdateServer) -> Result<()>;

    async fn list_members(&self, id: &ServerId) -> Result<Vec<Member>>;

    async fn join_server(&self, id: &ServerId) -> Result<()>;

    async fn leave_server(&self, id: &ServerId) -> Result<()>;

    // -- Channels & categories ----------------------------------------------

    async fn create_channel(&self, server: &ServerId, create: CreateChannel) -> Result<()>;

    async fn update_channel(
        &self,
        server: &ServerId,
        channel: &ChannelId,
        update: UpdateChannel,
    ) -> Result<()>;

    async fn delete_channel(&self, server: &ServerId, channel: &ChannelId) -> Result<()>;

    async fn create_category(&self, server: &ServerId, create: CreateCategory) -> Result<()>;

    async fn update_category(
        &self,
        server: &ServerId,
        category: &CategoryId,
        update: UpdateCategory,
    ) -> Result<()>;

    async fn delete_category(&self, server: &ServerId, category: &CategoryId) -> Result<()>;

    // -- Roles & members ----------------------------------------------------

    async fn create_role(&self, server: &ServerId, create: CreateRole) -> Result<()>;

    async fn update_role(&self, server: &ServerId, role: &RoleId, update: UpdateRole)
        -> Result<()>;

    async fn delete_role(&self, server: &ServerId, role: &RoleId) -> Result<()>;

    async fn update_member(
        &self,
        server: &ServerId,
        member: &WalletAddress,
        update: UpdateMember,
    ) -> Result<()>;

    // -- Messages -----------------------------------------------------------

    async fn list_messages(&self, server: &ServerId, channel: &ChannelId) -> Result<Vec<Message>>;

    async fn send_message(
        &self,
        server: &ServerId,
        channel: &ChannelId,
        send: SendMessage,
    ) -> Result<()>;

    async fn edit_message(
        &self,
        server: &ServerId,
        channel: &ChannelId,
        message: &MessageId,
        content: &str,
    ) -> Result<()>;

    async fn delete_message(
        &self,
        server: &ServerId,
        channel: &ChannelId,
        message: &MessageId,
    ) -> Result<()>;

    // -- Friends ------------------------------------------------------------

    async fn send_friend_request(&self, to: &WalletAddress) -> Result<()>;

    async fn accept_friend_request(&self, from: &WalletAddress) -> Result<()>;

    async fn remove_friend(&self, address: &WalletAddress) -> Result<()>;

    // -- Direct messages ----------------------------------------------------

    /// List the messages of the conversation with `counterpart`, read
    /// through the *caller's own* DM process handle.
    async fn list_dm_messages(
        &self,
        dm_process: &str,
        counterpart: &WalletAddress,
    ) -> Result<Vec<Message>>;

    async fn send_dm(
        &self,
        dm_process: &str,
        counterpart: &WalletAddress,
        content: &str,
    ) -> Result<()>;
}
