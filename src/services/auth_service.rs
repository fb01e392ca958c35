//! 认证服务：注册、登录、登出、令牌刷新

use crate::{
    auth::{
        jwt::{JwtService, TokenPair, REFRESH_TOKEN_TTL},
        middleware::Actor,
        password::PasswordHasher,
        session::SessionStore,
    },
    config::SecurityConfig,
    error::AppError,
    models::{
        auth::{LoginRequest, RegisterRequest},
        user::{NewUser, User},
        Role,
    },
    repository::UserRepository,
    services::with_deadline,
};
use std::sync::Arc;
use std::time::Duration;

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionStore>,
    jwt_service: Arc<JwtService>,
    hasher: PasswordHasher,
    password_min_length: usize,
    operation_timeout: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionStore>,
        jwt_service: Arc<JwtService>,
        hasher: PasswordHasher,
        security: &SecurityConfig,
    ) -> Self {
        Self {
            users,
            sessions,
            jwt_service,
            hasher,
            password_min_length: security.password_min_length,
            operation_timeout: Duration::from_secs(security.operation_timeout_secs),
        }
    }

    /// 用户注册，新用户默认角色为 editor
    pub async fn register(&self, req: RegisterRequest) -> Result<User, AppError> {
        with_deadline(self.operation_timeout, "register", async {
            if req.password.chars().count() < self.password_min_length {
                return Err(AppError::Validation(format!(
                    "password must be at least {} characters",
                    self.password_min_length
                )));
            }

            let password_hash = self.hash_password(req.password).await?;

            let new_user = NewUser {
                first_name: req.first_name,
                last_name: req.last_name,
                email: req.email,
                password_hash,
                role: Role::Editor,
                avatar: req.avatar.filter(|a| !a.trim().is_empty()),
            };

            let user = self.users.create(&new_user).await?;

            tracing::info!(user_id = user.id, email = %user.email, "User registered");
            Ok(user)
        })
        .await
    }

    /// 用户登录
    ///
    /// 用户不存在与密码错误返回同一个 `Unauthorized`，避免账号枚举。
    /// 令牌只有在刷新令牌写入会话存储之后才返回给调用方。
    pub async fn login(&self, req: LoginRequest) -> Result<TokenPair, AppError> {
        with_deadline(self.operation_timeout, "login", async {
            let Some(user) = self.users.find_by_email(&req.email).await? else {
                tracing::warn!(email = %req.email, "Login failed: user not found");
                metrics::counter!("auth_login_total", "result" => "failure").increment(1);
                return Err(AppError::Unauthorized);
            };

            if !self.verify_password(req.password, user.password_hash.clone()).await? {
                tracing::warn!(email = %req.email, "Login failed: incorrect password");
                metrics::counter!("auth_login_total", "result" => "failure").increment(1);
                return Err(AppError::Unauthorized);
            }

            let token_pair = self.jwt_service.generate_tokens(user.id, user.role)?;

            self.sessions
                .save(user.id, &token_pair.refresh_token, REFRESH_TOKEN_TTL)
                .await
                .map_err(|e| {
                    tracing::error!(user_id = user.id, "Failed to save refresh token: {}", e);
                    e
                })?;

            metrics::counter!("auth_login_total", "result" => "success").increment(1);
            tracing::info!(user_id = user.id, email = %user.email, "User logged in");

            Ok(token_pair)
        })
        .await
    }

    /// 登出（删除会话）。调用方已经过认证中间件
    pub async fn logout(&self, user_id: i64) -> Result<(), AppError> {
        with_deadline(self.operation_timeout, "logout", async {
            self.sessions.invalidate(user_id).await?;
            tracing::info!(user_id, "User logged out");
            Ok(())
        })
        .await
    }

    /// 刷新令牌：校验刷新令牌与会话中保存的一致，然后轮换
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        with_deadline(self.operation_timeout, "refresh", async {
            let claims = self.jwt_service.validate_refresh_token(refresh_token)?;

            let current = self.sessions.get(claims.user_id).await?;
            if current.as_deref() != Some(refresh_token) {
                tracing::warn!(user_id = claims.user_id, "Refresh token not bound to a live session");
                return Err(AppError::Unauthorized);
            }

            // 角色以数据库为准
            let user = self
                .users
                .find_by_id(claims.user_id)
                .await?
                .ok_or(AppError::Unauthorized)?;

            let token_pair = self.jwt_service.generate_tokens(user.id, user.role)?;
            self.sessions
                .save(user.id, &token_pair.refresh_token, REFRESH_TOKEN_TTL)
                .await?;

            tracing::debug!(user_id = user.id, "Token pair rotated");
            Ok(token_pair)
        })
        .await
    }

    /// 当前登录用户信息
    pub async fn current_user(&self, actor: &Actor) -> Result<User, AppError> {
        with_deadline(self.operation_timeout, "current_user", async {
            self.users
                .find_by_id(actor.user_id)
                .await?
                .ok_or_else(|| AppError::not_found("user"))
        })
        .await
    }

    // Argon2 是 CPU 密集操作，放到阻塞线程池执行
    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))
    }
}
