//! Test support: a deterministic in-memory remote service plus fixture
//! helpers shared by the action and lifecycle tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Notify;

use subspace_remote::{
    CreateCategory, CreateChannel, CreateRole, CreateServer, ProfileUpdate, RemoteError,
    RemoteService, Result, SendMessage, UpdateCategory, UpdateChannel, UpdateMember, UpdateRole,
    UpdateServer,
};
use subspace_shared::types::{CategoryId, ChannelId, MessageId, RoleId, ServerId, WalletAddress};
use subspace_shared::wallet::{ConnectionStrategy, WalletIdentity};
use subspace_store::models::{
    Category, Channel, FriendStatus, Member, MemberLoadState, Message, Profile, Role, Server,
    ServerRef,
};

use crate::client::Client;
use crate::config::ClientConfig;

/// Tight delays so settle refetches are observable without long sleeps.
/// Poll intervals are effectively disabled; poll tests override them.
pub(crate) fn fast_config() -> ClientConfig {
    ClientConfig {
        structural_refetch_delay: Duration::from_millis(10),
        message_refetch_delay: Duration::from_millis(15),
        server_walk_delay: Duration::from_millis(2),
        profile_poll_interval: Duration::from_secs(3_600),
        message_poll_interval: Duration::from_secs(3_600),
    }
}

/// Wait out every settle refetch scheduled under the client's config.
pub(crate) async fn settle(client: &Client) {
    let config = client.config();
    let delay = config
        .structural_refetch_delay
        .max(config.message_refetch_delay);
    tokio::time::sleep(delay * 4).await;
}

/// Build a client bound to `address` (profile auto-created on the mock).
pub(crate) async fn bound_client(remote: &Arc<MockRemote>, address: &str) -> Client {
    remote.ensure_profile(address);
    remote.set_acting(address);
    let client = Client::new(remote.clone(), fast_config());
    client
        .bind_wallet(
            WalletIdentity::new(WalletAddress::from(address)),
            ConnectionStrategy::Injected,
        )
        .await;
    client
}

/// Like [`bound_client`], with an own DM process handle on the profile.
pub(crate) async fn bound_client_with_dm(
    remote: &Arc<MockRemote>,
    address: &str,
    dm_process: &str,
) -> Client {
    remote.add_profile(TestProfile::new(address).with_dm_process(dm_process).build());
    remote.set_acting(address);
    let client = Client::new(remote.clone(), fast_config());
    client
        .bind_wallet(
            WalletIdentity::new(WalletAddress::from(address)),
            ConnectionStrategy::Injected,
        )
        .await;
    client
}

/// Profile fixture builder.
pub(crate) struct TestProfile {
    profile: Profile,
}

impl TestProfile {
    pub fn new(address: &str) -> Self {
        Self {
            profile: Profile::new(WalletAddress::from(address)),
        }
    }

    pub fn with_username(mut self, username: &str) -> Self {
        self.profile.username = Some(username.to_string());
        self
    }

    pub fn with_dm_process(mut self, dm_process: &str) -> Self {
        self.profile.dm_process = Some(dm_process.to_string());
        self
    }

    pub fn with_friend(mut self, status: FriendStatus, address: &str) -> Self {
        let address = WalletAddress::from(address);
        match status {
            FriendStatus::Accepted => self.profile.friends.accepted.push(address),
            FriendStatus::Sent => self.profile.friends.sent.push(address),
            FriendStatus::Received => self.profile.friends.received.push(address),
        }
        self
    }

    pub fn with_servers(mut self, ids: &[&str]) -> Self {
        self.profile.joined_servers = ids
            .iter()
            .map(|id| ServerRef::Id(ServerId::from(*id)))
            .collect();
        self
    }

    pub fn build(self) -> Profile {
        self.profile
    }
}

#[derive(Default)]
struct MockState {
    profiles: HashMap<WalletAddress, Profile>,
    servers: HashMap<ServerId, Server>,
    members: HashMap<ServerId, Vec<Member>>,
    messages: HashMap<ChannelId, Vec<Message>>,
    dms: HashMap<WalletAddress, Vec<Message>>,
    /// Identity the mock acts on behalf of (for profile/friend writes).
    acting: Option<WalletAddress>,
    calls: Vec<String>,
    failures: HashSet<String>,
    gates: HashMap<String, Arc<Notify>>,
    last_dm_process: Option<String>,
    counter: u64,
}

/// In-memory [`RemoteService`] with injectable failures and per-call gating.
///
/// Every operation records a `"{op}:{key}"` entry; tests assert on those to
/// prove how many logical fetches actually reached the service. Writes
/// mutate the mock's state so a later fetch observes them, mimicking the
/// real service after its propagation delay.
#[derive(Default)]
pub(crate) struct MockRemote {
    state: Mutex<MockState>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock remote poisoned")
    }

    /// Record the call, fail if injected, and park on the gate if one is
    /// registered. Gates are one-shot.
    async fn enter(&self, key: String) -> Result<()> {
        let gate = {
            let mut state = self.lock();
            state.calls.push(key.clone());
            if state.failures.contains(&key) {
                return Err(RemoteError::Transport("injected failure".to_string()));
            }
            state.gates.remove(&key)
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(())
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut state = self.lock();
        state.counter += 1;
        format!("{prefix}{}", state.counter)
    }

    // -- Fixtures -----------------------------------------------------------

    pub fn server(id: &str) -> Server {
        Server {
            id: ServerId::from(id),
            name: format!("Server {id}"),
            description: None,
            icon: None,
            owner: WalletAddress::from("owner"),
            channels: Vec::new(),
            categories: Vec::new(),
            roles: Vec::new(),
            members: None,
            member_state: MemberLoadState::NotLoaded,
        }
    }

    pub fn role(id: &str, position: i64) -> Role {
        Role {
            id: RoleId::from(id),
            name: format!("Role {id}"),
            color: None,
            position,
            permissions: 0,
        }
    }

    pub fn message(id: &str, secs: i64) -> Message {
        Message {
            id: MessageId::from(id),
            author: WalletAddress::from("author"),
            content: format!("message {id}"),
            timestamp: DateTime::from_timestamp(secs, 0).unwrap(),
            edited: false,
            reply_to: None,
        }
    }

    pub fn add_profile(&self, profile: Profile) {
        self.lock().profiles.insert(profile.address.clone(), profile);
    }

    pub fn ensure_profile(&self, address: &str) {
        let address = WalletAddress::from(address);
        self.lock()
            .profiles
            .entry(address.clone())
            .or_insert_with(|| Profile::new(address));
    }

    pub fn add_server(&self, server: Server) {
        self.lock().servers.insert(server.id.clone(), server);
    }

    pub fn set_members(&self, server: &str, addresses: Vec<&str>) {
        let members = addresses
            .into_iter()
            .map(|address| Member {
                address: WalletAddress::from(address),
                nickname: None,
                roles: Vec::new(),
            })
            .collect();
        self.lock().members.insert(ServerId::from(server), members);
    }

    pub fn set_messages(&self, channel: &str, messages: Vec<(&str, i64)>) {
        let messages = messages
            .into_iter()
            .map(|(id, secs)| Self::message(id, secs))
            .collect();
        self.lock().messages.insert(ChannelId::from(channel), messages);
    }

    pub fn set_dm_messages(&self, counterpart: &str, messages: Vec<(&str, i64)>) {
        let messages = messages
            .into_iter()
            .map(|(id, secs)| Self::message(id, secs))
            .collect();
        self.lock().dms.insert(WalletAddress::from(counterpart), messages);
    }

    pub fn set_acting(&self, address: &str) {
        self.lock().acting = Some(WalletAddress::from(address));
    }

    // -- Instrumentation ----------------------------------------------------

    pub fn fail_on(&self, key: &str) {
        self.lock().failures.insert(key.to_string());
    }

    /// Register a one-shot gate: the next call with this key parks until
    /// the returned handle is notified.
    pub fn gate(&self, key: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.lock().gates.insert(key.to_string(), gate.clone());
        gate
    }

    pub fn calls(&self, key: &str) -> usize {
        self.lock().calls.iter().filter(|c| *c == key).count()
    }

    pub fn calls_matching(&self, prefix: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn call_order(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn last_dm_process(&self) -> Option<String> {
        self.lock().last_dm_process.clone()
    }

    pub fn last_role_position(&self, server: &str, role: &str) -> Option<i64> {
        self.lock()
            .servers
            .get(&ServerId::from(server))?
            .roles
            .iter()
            .find(|r| r.id == RoleId::from(role))
            .map(|r| r.position)
    }

    fn acting(&self) -> Result<WalletAddress> {
        self.lock()
            .acting
            .clone()
            .ok_or_else(|| RemoteError::Rejected("no acting identity".to_string()))
    }
}

#[async_trait]
impl RemoteService for MockRemote {
    async fn get_profile(&self, address: &WalletAddress) -> Result<Profile> {
        self.enter(format!("get_profile:{address}")).await?;
        self.lock()
            .profiles
            .get(address)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(address.to_string()))
    }

    async fn create_profile(&self, update: ProfileUpdate) -> Result<Profile> {
        self.enter("create_profile".to_string()).await?;
        let acting = self.acting()?;
        let mut profile = Profile::new(acting.clone());
        profile.username = update.username;
        profile.pfp = update.pfp;
        profile.bio = update.bio;
        self.lock().profiles.insert(acting, profile.clone());
        Ok(profile)
    }

    async fn update_profile(&self, update: ProfileUpdate) -> Result<()> {
        self.enter("update_profile".to_string()).await?;
        let acting = self.acting()?;
        let mut state = self.lock();
        let profile = state
            .profiles
            .get_mut(&acting)
            .ok_or_else(|| RemoteError::NotFound(acting.to_string()))?;
        if let Some(username) = update.username {
            profile.username = Some(username);
        }
        if let Some(pfp) = update.pfp {
            profile.pfp = Some(pfp);
        }
        if let Some(bio) = update.bio {
            profile.bio = Some(bio);
        }
        Ok(())
    }

    async fn get_server(&self, id: &ServerId) -> Result<Server> {
        self.enter(format!("get_server:{id}")).await?;
        self.lock()
            .servers
            .get(id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))
    }

    async fn create_server(&self, create: CreateServer) -> Result<ServerId> {
        self.enter("create_server".to_string()).await?;
        let id = ServerId::from("srv-new");
        let server = Server {
            id: id.clone(),
            name: create.name,
            description: create.description,
            icon: create.icon,
            owner: self.acting()?,
            channels: Vec::new(),
            categories: Vec::new(),
            roles: Vec::new(),
            members: None,
            member_state: MemberLoadState::NotLoaded,
        };
        self.lock().servers.insert(id.clone(), server);
        Ok(id)
    }

    async fn update_server(&self, id: &ServerId, update: UpdateServer) -> Result<()> {
        self.enter(format!("update_server:{id}")).await?;
        let mut state = self.lock();
        let server = state
            .servers
            .get_mut(id)
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))?;
        if let Some(name) = update.name {
            server.name = name;
        }
        if let Some(description) = update.description {
            server.description = Some(description);
        }
        if let Some(icon) = update.icon {
            server.icon = Some(icon);
        }
        Ok(())
    }

    async fn list_members(&self, id: &ServerId) -> Result<Vec<Member>> {
        self.enter(format!("list_members:{id}")).await?;
        Ok(self.lock().members.get(id).cloned().unwrap_or_default())
    }

    async fn join_server(&self, id: &ServerId) -> Result<()> {
        self.enter(format!("join_server:{id}")).await?;
        let acting = self.acting()?;
        let mut state = self.lock();
        if let Some(profile) = state.profiles.get_mut(&acting) {
            profile.joined_servers.push(ServerRef::Id(id.clone()));
        }
        Ok(())
    }

    async fn leave_server(&self, id: &ServerId) -> Result<()> {
        self.enter(format!("leave_server:{id}")).await?;
        let acting = self.acting()?;
        let mut state = self.lock();
        if let Some(profile) = state.profiles.get_mut(&acting) {
            profile
                .joined_servers
                .retain(|r| r.server_id() != Some(id));
        }
        Ok(())
    }

    async fn create_channel(&self, server: &ServerId, create: CreateChannel) -> Result<()> {
        self.enter(format!("create_channel:{server}")).await?;
        let id = ChannelId::new(self.next_id("ch-"));
        let mut state = self.lock();
        let server = state
            .servers
            .get_mut(server)
            .ok_or_else(|| RemoteError::NotFound(server.to_string()))?;
        let order = create
            .order
            .unwrap_or_else(|| server.channels.len() as i64);
        server.channels.push(Channel {
            id,
            name: create.name,
            order,
            category_id: create.category_id,
        });
        Ok(())
    }

    async fn update_channel(
        &self,
        server: &ServerId,
        channel: &ChannelId,
        update: UpdateChannel,
    ) -> Result<()> {
        self.enter(format!("update_channel:{channel}")).await?;
        let mut state = self.lock();
        let server = state
            .servers
            .get_mut(server)
            .ok_or_else(|| RemoteError::NotFound(server.to_string()))?;
        let channel = server
            .channels
            .iter_mut()
            .find(|c| c.id == *channel)
            .ok_or_else(|| RemoteError::NotFound(channel.to_string()))?;
        if let Some(name) = update.name {
            channel.name = name;
        }
        if let Some(category_id) = update.category_id {
            channel.category_id = Some(category_id);
        }
        if let Some(order) = update.order {
            channel.order = order;
        }
        Ok(())
    }

    async fn delete_channel(&self, server: &ServerId, channel: &ChannelId) -> Result<()> {
        self.enter(format!("delete_channel:{channel}")).await?;
        let mut state = self.lock();
        if let Some(server) = state.servers.get_mut(server) {
            server.channels.retain(|c| c.id != *channel);
        }
        Ok(())
    }

    async fn create_category(&self, server: &ServerId, create: CreateCategory) -> Result<()> {
        self.enter(format!("create_category:{server}")).await?;
        let id = CategoryId::new(self.next_id("cat-"));
        let mut state = self.lock();
        let server = state
            .servers
            .get_mut(server)
            .ok_or_else(|| RemoteError::NotFound(server.to_string()))?;
        let order = create
            .order
            .unwrap_or_else(|| server.categories.len() as i64);
        server.categories.push(Category {
            id,
            name: create.name,
            order,
        });
        Ok(())
    }

    async fn update_category(
        &self,
        server: &ServerId,
        category: &CategoryId,
        update: UpdateCategory,
    ) -> Result<()> {
        self.enter(format!("update_category:{category}")).await?;
        let mut state = self.lock();
        let server = state
            .servers
            .get_mut(server)
            .ok_or_else(|| RemoteError::NotFound(server.to_string()))?;
        let category = server
            .categories
            .iter_mut()
            .find(|c| c.id == *category)
            .ok_or_else(|| RemoteError::NotFound(category.to_string()))?;
        if let Some(name) = update.name {
            category.name = name;
        }
        if let Some(order) = update.order {
            category.order = order;
        }
        Ok(())
    }

    async fn delete_category(&self, server: &ServerId, category: &CategoryId) -> Result<()> {
        self.enter(format!("delete_category:{category}")).await?;
        let mut state = self.lock();
        if let Some(server) = state.servers.get_mut(server) {
            server.categories.retain(|c| c.id != *category);
        }
        Ok(())
    }

    async fn create_role(&self, server: &ServerId, create: CreateRole) -> Result<()> {
        self.enter(format!("create_role:{server}")).await?;
        let id = RoleId::new(self.next_id("role-"));
        let mut state = self.lock();
        let server = state
            .servers
            .get_mut(server)
            .ok_or_else(|| RemoteError::NotFound(server.to_string()))?;
        let position = server
            .roles
            .iter()
            .map(|r| r.position)
            .max()
            .unwrap_or(0)
            + 1;
        server.roles.push(Role {
            id,
            name: create.name,
            color: create.color,
            position,
            permissions: create.permissions.unwrap_or(0),
        });
        Ok(())
    }

    async fn update_role(
        &self,
        server: &ServerId,
        role: &RoleId,
        update: UpdateRole,
    ) -> Result<()> {
        self.enter(format!("update_role:{role}")).await?;
        let mut state = self.lock();
        let server = state
            .servers
            .get_mut(server)
            .ok_or_else(|| RemoteError::NotFound(server.to_string()))?;
        let role = server
            .roles
            .iter_mut()
            .find(|r| r.id == *role)
            .ok_or_else(|| RemoteError::NotFound(role.to_string()))?;
        if let Some(name) = update.name {
            role.name = name;
        }
        if let Some(color) = update.color {
            role.color = Some(color);
        }
        if let Some(position) = update.position {
            role.position = position;
        }
        if let Some(permissions) = update.permissions {
            role.permissions = permissions;
        }
        Ok(())
    }

    async fn delete_role(&self, server: &ServerId, role: &RoleId) -> Result<()> {
        self.enter(format!("delete_role:{role}")).await?;
        let mut state = self.lock();
        if let Some(server) = state.servers.get_mut(server) {
            server.roles.retain(|r| r.id != *role);
        }
        Ok(())
    }

    async fn update_member(
        &self,
        server: &ServerId,
        member: &WalletAddress,
        update: UpdateMember,
    ) -> Result<()> {
        self.enter(format!("update_member:{member}")).await?;
        let mut state = self.lock();
        let members = state
            .members
            .get_mut(server)
            .ok_or_else(|| RemoteError::NotFound(server.to_string()))?;
        let entry = members
            .iter_mut()
            .find(|m| m.address == *member)
            .ok_or_else(|| RemoteError::NotFound(member.to_string()))?;
        if let Some(nickname) = update.nickname {
            entry.nickname = Some(nickname);
        }
        if let Some(roles) = update.roles {
            entry.roles = roles;
        }
        Ok(())
    }

    async fn list_messages(&self, _server: &ServerId, channel: &ChannelId) -> Result<Vec<Message>> {
        self.enter(format!("list_messages:{channel}")).await?;
        Ok(self.lock().messages.get(channel).cloned().unwrap_or_default())
    }

    async fn send_message(
        &self,
        _server: &ServerId,
        channel: &ChannelId,
        send: SendMessage,
    ) -> Result<()> {
        self.enter(format!("send_message:{channel}")).await?;
        let author = self.acting().unwrap_or_else(|_| WalletAddress::from("author"));
        let id = MessageId::new(uuid::Uuid::new_v4().to_string());
        let mut state = self.lock();
        state.messages.entry(channel.clone()).or_default().push(Message {
            id,
            author,
            content: send.content,
            timestamp: Utc::now(),
            edited: false,
            reply_to: send.reply_to,
        });
        Ok(())
    }

    async fn edit_message(
        &self,
        _server: &ServerId,
        channel: &ChannelId,
        message: &MessageId,
        content: &str,
    ) -> Result<()> {
        self.enter(format!("edit_message:{message}")).await?;
        let mut state = self.lock();
        let messages = state
            .messages
            .get_mut(channel)
            .ok_or_else(|| RemoteError::NotFound(channel.to_string()))?;
        let entry = messages
            .iter_mut()
            .find(|m| m.id == *message)
            .ok_or_else(|| RemoteError::NotFound(message.to_string()))?;
        entry.content = content.to_string();
        entry.edited = true;
        Ok(())
    }

    async fn delete_message(
        &self,
        _server: &ServerId,
        channel: &ChannelId,
        message: &MessageId,
    ) -> Result<()> {
        self.enter(format!("delete_message:{message}")).await?;
        let mut state = self.lock();
        if let Some(messages) = state.messages.get_mut(channel) {
            messages.retain(|m| m.id != *message);
        }
        Ok(())
    }

    async fn send_friend_request(&self, to: &WalletAddress) -> Result<()> {
        self.enter(format!("send_friend_request:{to}")).await?;
        let acting = self.acting()?;
        let mut state = self.lock();
        if let Some(profile) = state.profiles.get_mut(&acting) {
            profile.friends.sent.push(to.clone());
        }
        if let Some(profile) = state.profiles.get_mut(to) {
            profile.friends.received.push(acting.clone());
        }
        Ok(())
    }

    async fn accept_friend_request(&self, from: &WalletAddress) -> Result<()> {
        self.enter(format!("accept_friend_request:{from}")).await?;
        let acting = self.acting()?;
        let mut state = self.lock();
        if let Some(profile) = state.profiles.get_mut(&acting) {
            profile.friends.received.retain(|a| a != from);
            profile.friends.accepted.push(from.clone());
        }
        if let Some(profile) = state.profiles.get_mut(from) {
            profile.friends.sent.retain(|a| a != &acting);
            profile.friends.accepted.push(acting.clone());
        }
        Ok(())
    }

    async fn remove_friend(&self, address: &WalletAddress) -> Result<()> {
        self.enter(format!("remove_friend:{address}")).await?;
        let acting = self.acting()?;
        let mut state = self.lock();
        if let Some(profile) = state.profiles.get_mut(&acting) {
            profile.friends.accepted.retain(|a| a != address);
            profile.friends.sent.retain(|a| a != address);
            profile.friends.received.retain(|a| a != address);
        }
        if let Some(profile) = state.profiles.get_mut(address) {
            profile.friends.accepted.retain(|a| a != &acting);
            profile.friends.sent.retain(|a| a != &acting);
            profile.friends.received.retain(|a| a != &acting);
        }
        Ok(())
    }

    async fn list_dm_messages(
        &self,
        dm_process: &str,
        counterpart: &WalletAddress,
    ) -> Result<Vec<Message>> {
        self.enter(format!("list_dm_messages:{counterpart}")).await?;
        let mut state = self.lock();
        state.last_dm_process = Some(dm_process.to_string());
        Ok(state.dms.get(counterpart).cloned().unwrap_or_default())
    }

    async fn send_dm(
        &self,
        dm_process: &str,
        counterpart: &WalletAddress,
        content: &str,
    ) -> Result<()> {
        self.enter(format!("send_dm:{counterpart}")).await?;
        let author = self.acting().unwrap_or_else(|_| WalletAddress::from("author"));
        let id = MessageId::new(uuid::Uuid::new_v4().to_string());
        let mut state = self.lock();
        state.last_dm_process = Some(dm_process.to_string());
        state.dms.entry(counterpart.clone()).or_default().push(Message {
            id,
            author,
            content: content.to_string(),
            timestamp: Utc::now(),
            edited: false,
            reply_to: None,
        });
        Ok(())
    }
}
