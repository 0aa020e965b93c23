use log::{debug, error};

use crate::{
    CreateError, DEFAULT_PROTOCOLS, DeleteError, Gender, Name, ProfileRepository,
    ProfileService, Protocol, ProtocolID, ProtocolRepository, ProtocolService, ReadError,
    StorageError, TestEntry, TimerProtocol, UpdateError, UserProfile, is_builtin,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoProfile) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: ProfileRepository> Service<R> {
    async fn read_existing_profile(&self) -> Result<UserProfile, ReadError> {
        self.repository
            .read_profile()
            .await?
            .ok_or(ReadError::Storage(StorageError::NoProfile))
    }

    async fn modify_profile(
        &self,
        name: Name,
        gender: Gender,
        age: u32,
    ) -> Result<UserProfile, UpdateError> {
        let profile = match self.repository.read_profile().await? {
            Some(profile) => UserProfile {
                name,
                gender,
                age,
                ..profile
            },
            None => UserProfile::new(name, gender, age),
        };
        self.repository.write_profile(profile).await
    }

    async fn add_test(&self, entry: TestEntry) -> Result<TestEntry, CreateError> {
        let mut profile = self.read_existing_profile().await?;
        profile.append_test(entry.clone());
        self.repository.write_profile(profile).await?;
        Ok(entry)
    }

    async fn modify_test(&self, index: usize, entry: TestEntry) -> Result<TestEntry, UpdateError> {
        let mut profile = self.read_existing_profile().await?;
        profile
            .replace_test(index, entry.clone())
            .ok_or(UpdateError::NotFound)?;
        self.repository.write_profile(profile).await?;
        Ok(entry)
    }

    async fn remove_test(&self, index: usize) -> Result<TestEntry, DeleteError> {
        let mut profile = self.read_existing_profile().await?;
        let entry = profile.delete_test(index).ok_or(DeleteError::NotFound)?;
        self.repository.write_profile(profile).await?;
        Ok(entry)
    }
}

impl<R: ProfileRepository> ProfileService for Service<R> {
    async fn get_profile(&self) -> Result<Option<UserProfile>, ReadError> {
        log_on_error!(self.repository.read_profile(), ReadError, "get", "profile")
    }

    async fn save_profile(
        &self,
        name: Name,
        gender: Gender,
        age: u32,
    ) -> Result<UserProfile, UpdateError> {
        log_on_error!(
            self.modify_profile(name, gender, age),
            UpdateError,
            "save",
            "profile"
        )
    }

    async fn delete_profile(&self) -> Result<(), DeleteError> {
        log_on_error!(
            self.repository.delete_profile(),
            DeleteError,
            "delete",
            "profile"
        )
    }

    async fn import_profile(&self, mut profile: UserProfile) -> Result<UserProfile, UpdateError> {
        profile.tests.sort_by_key(|t| t.date);
        log_on_error!(
            self.repository.write_profile(profile),
            UpdateError,
            "import",
            "profile"
        )
    }

    async fn append_test(&self, entry: TestEntry) -> Result<TestEntry, CreateError> {
        log_on_error!(self.add_test(entry), CreateError, "append", "test")
    }

    async fn replace_test(&self, index: usize, entry: TestEntry) -> Result<TestEntry, UpdateError> {
        log_on_error!(
            self.modify_test(index, entry),
            UpdateError,
            "replace",
            "test"
        )
    }

    async fn delete_test(&self, index: usize) -> Result<TestEntry, DeleteError> {
        log_on_error!(self.remove_test(index), DeleteError, "delete", "test")
    }
}

impl<R: ProtocolRepository> Service<R> {
    async fn read_all_protocols(&self) -> Result<Vec<Protocol>, ReadError> {
        let custom = self.repository.read_protocols().await?;
        Ok(DEFAULT_PROTOCOLS.iter().cloned().chain(custom).collect())
    }

    async fn find_protocol(&self, id: &ProtocolID) -> Result<Option<Protocol>, ReadError> {
        Ok(self
            .read_all_protocols()
            .await?
            .into_iter()
            .find(|p| p.id == *id))
    }

    async fn add_protocol(
        &self,
        name: Name,
        description: String,
        timer: TimerProtocol,
    ) -> Result<Protocol, CreateError> {
        let protocol = Protocol {
            id: ProtocolID::custom(),
            name,
            description,
            custom: true,
            timer,
        };
        let mut protocols = self.repository.read_protocols().await?;
        protocols.push(protocol.clone());
        self.repository.write_protocols(protocols).await?;
        Ok(protocol)
    }

    async fn modify_protocol(&self, protocol: Protocol) -> Result<Protocol, UpdateError> {
        if is_builtin(&protocol.id) {
            return Err(UpdateError::Other(
                format!("built-in protocol {} cannot be modified", protocol.id).into(),
            ));
        }
        let mut protocols = self.repository.read_protocols().await?;
        let current = protocols
            .iter_mut()
            .find(|p| p.id == protocol.id)
            .ok_or(UpdateError::NotFound)?;
        *current = Protocol {
            custom: true,
            ..protocol
        };
        let protocol = current.clone();
        self.repository.write_protocols(protocols).await?;
        Ok(protocol)
    }

    async fn remove_protocol(&self, id: &ProtocolID) -> Result<ProtocolID, DeleteError> {
        if is_builtin(id) {
            return Err(DeleteError::Other(
                format!("built-in protocol {id} cannot be deleted").into(),
            ));
        }
        let mut protocols = self.repository.read_protocols().await?;
        let len = protocols.len();
        protocols.retain(|p| p.id != *id);
        if protocols.len() == len {
            return Err(DeleteError::NotFound);
        }
        self.repository.write_protocols(protocols).await?;
        Ok(id.clone())
    }

    async fn replace_custom_protocols(
        &self,
        protocols: Vec<Protocol>,
    ) -> Result<Vec<Protocol>, UpdateError> {
        let protocols = protocols
            .into_iter()
            .filter(|p| !is_builtin(&p.id))
            .map(|p| Protocol { custom: true, ..p })
            .collect();
        self.repository.write_protocols(protocols).await
    }
}

impl<R: ProtocolRepository> ProtocolService for Service<R> {
    async fn get_protocols(&self) -> Result<Vec<Protocol>, ReadError> {
        log_on_error!(self.read_all_protocols(), ReadError, "get", "protocols")
    }

    async fn get_protocol(&self, id: &ProtocolID) -> Result<Option<Protocol>, ReadError> {
        log_on_error!(self.find_protocol(id), ReadError, "get", "protocol")
    }

    async fn create_protocol(
        &self,
        name: Name,
        description: String,
        timer: TimerProtocol,
    ) -> Result<Protocol, CreateError> {
        log_on_error!(
            self.add_protocol(name, description, timer),
            CreateError,
            "create",
            "protocol"
        )
    }

    async fn replace_protocol(&self, protocol: Protocol) -> Result<Protocol, UpdateError> {
        log_on_error!(
            self.modify_protocol(protocol),
            UpdateError,
            "replace",
            "protocol"
        )
    }

    async fn delete_protocol(&self, id: &ProtocolID) -> Result<ProtocolID, DeleteError> {
        log_on_error!(self.remove_protocol(id), DeleteError, "delete", "protocol")
    }

    async fn import_protocols(
        &self,
        protocols: Vec<Protocol>,
    ) -> Result<Vec<Protocol>, UpdateError> {
        log_on_error!(
            self.replace_custom_protocols(protocols),
            UpdateError,
            "import",
            "protocols"
        )
    }
}
