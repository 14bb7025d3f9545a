//! 用户注册与认证用例

use std::sync::Arc;

use domain::{Credential, DomainError, User, UserId, UserRepository, Username};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::ApplicationError;
use crate::password::PasswordHasher;

const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug)]
pub struct RegisterUserRequest {
    pub username: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug)]
pub struct AuthenticateUserRequest {
    pub username: String,
    pub password: String,
}

pub struct UserServiceDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub clock: Arc<dyn Clock>,
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    pub fn new(deps: UserServiceDependencies) -> Self {
        Self {
            users: deps.user_repository,
            password_hasher: deps.password_hasher,
            clock: deps.clock,
        }
    }

    /// 注册新用户。
    ///
    /// 用户名唯一性由凭据存储保证，冲突区别于普通失败向上传递。
    pub async fn register(&self, request: RegisterUserRequest) -> Result<User, ApplicationError> {
        let username = Username::parse(request.username)?;
        if request.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(DomainError::invalid_argument(
                "password",
                "must be at least 6 characters long",
            )
            .into());
        }

        let display_name = request.display_name.trim();
        let display_name = if display_name.is_empty() {
            username.as_str().to_owned()
        } else {
            display_name.to_owned()
        };

        let password = self.password_hasher.hash(&request.password).await?;
        let id = UserId::parse(Uuid::new_v4().to_string())?;
        let credential = Credential::register(
            id,
            username.clone(),
            display_name,
            password,
            self.clock.now(),
        );

        self.users
            .insert(&credential)
            .await
            .map_err(|err| match err {
                domain::RepositoryError::Conflict => DomainError::UserAlreadyExists.into(),
                other => ApplicationError::Repository(other),
            })?;

        tracing::info!(username = %username, "新用户注册成功");
        Ok(credential.to_user())
    }

    /// 用户名 + 密码认证。
    ///
    /// 用户不存在与密码不匹配返回同一个错误，不泄露哪一半错了。
    pub async fn authenticate(
        &self,
        request: AuthenticateUserRequest,
    ) -> Result<User, ApplicationError> {
        let credential = self
            .users
            .find_by_username(request.username.trim())
            .await?
            .ok_or(ApplicationError::Authentication)?;

        let matches = self
            .password_hasher
            .verify(&request.password, &credential.password)
            .await?;
        if !matches {
            return Err(ApplicationError::Authentication);
        }

        Ok(credential.to_user())
    }
}
