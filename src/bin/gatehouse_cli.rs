//!
//! gatehouse CLI binary
//! --------------------
//! Command-line client for the session guard: log in against the auth
//! service, inspect the stored identity and its capabilities, evaluate a
//! capability the way a protected page would, and log out. The credential is
//! persisted in a FileStore root, one slot under the key `token`.

use std::env;
use std::sync::Arc;

use anyhow::Result;

use gatehouse::auth::{AuthClient, NewUser};
use gatehouse::guard::{DeniedReason, Navigator, SessionGuard};
use gatehouse::identity::{capabilities_for, Capability, Role};
use gatehouse::store::FileStore;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} login [--user <u>] [--password <p>] [--auth-url <url>] [--root <path>]\n  {program} register --user <u> --email <e> --role <r> [--password <p>] [--auth-url <url>]\n  {program} whoami [--root <path>]\n  {program} check <capability> [--root <path>]\n  {program} logout [--root <path>]\n\nFlags:\n  --auth-url <url>   Auth service base URL (env: GATEHOUSE_AUTH_URL, default http://localhost:8001)\n  --root <path>      Credential store root (env: GATEHOUSE_ROOT, default .gatehouse)\n  --user <u>         Username (default: current OS user)\n  --password <p>     Password (prompted when omitted)\n  --email <e>        Email for register\n  --role <r>         Role for register: engineer | sales | accountant | admin\n  -h, --help         Show this help\n\nCapabilities:\n  view_projects use_measure view_quotes view_accounting view_hr view_activity\n\nExamples:\n  {program} login --user alice\n  {program} check view_hr\n  {program} whoami"
    );
}

/// Router stand-in for a CLI session: navigation becomes a log line.
struct TraceNavigator;

impl Navigator for TraceNavigator {
    fn navigate(&self, route: &str) {
        tracing::info!("nav.navigate route={}", route);
        println!("-> {route}");
    }
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag
            && i + 1 < args.len() {
                return Some(args[i + 1].clone());
            }
        i += 1;
    }
    None
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn prompt_password() -> Result<String> {
    let mut rl = rustyline::DefaultEditor::new()?;
    Ok(rl.readline("password: ")?)
}

fn open_store(args: &[String]) -> FileStore {
    match flag_value(args, "--root") {
        Some(root) => FileStore::new(root),
        None => FileStore::default_root(),
    }
}

fn auth_url(args: &[String]) -> String {
    flag_value(args, "--auth-url")
        .or_else(|| env::var("GATEHOUSE_AUTH_URL").ok())
        .unwrap_or_else(|| "http://localhost:8001".to_string())
}

fn print_identity(guard: &SessionGuard) -> bool {
    match guard.current_identity() {
        Some(identity) => {
            println!("user: {}", identity.user.as_deref().unwrap_or("-"));
            println!("role: {}", identity.role);
            if let Some(exp) = identity.claims.expires_at() {
                println!("expires: {exp}");
            }
            let caps: Vec<&str> = capabilities_for(identity.role).iter().map(Capability::as_str).collect();
            println!("capabilities: {}", caps.join(" "));
            true
        }
        None => {
            println!("no session (missing or undecodable credential)");
            false
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let mut args: Vec<String> = env::args().collect();
    let program = args.remove(0);

    if args.is_empty() || has_flag(&args, "--help") || has_flag(&args, "-h") {
        print_usage(&program);
        return Ok(());
    }

    let command = args.remove(0);
    let store: Arc<FileStore> = Arc::new(open_store(&args));
    let guard = SessionGuard::new(store.clone());
    let navigator: Arc<dyn Navigator> = Arc::new(TraceNavigator);

    match command.as_str() {
        "login" => {
            let user = flag_value(&args, "--user").unwrap_or_else(whoami::username);
            let password = match flag_value(&args, "--password") {
                Some(p) => p,
                None => prompt_password()?,
            };
            let client = AuthClient::new(&auth_url(&args))?;
            client.login_into(store.as_ref(), &user, &password).await?;
            println!("logged in as {user}");
            print_identity(&guard);
        }
        "register" => {
            let Some(username) = flag_value(&args, "--user") else {
                eprintln!("register requires --user");
                std::process::exit(2);
            };
            let Some(email) = flag_value(&args, "--email") else {
                eprintln!("register requires --email");
                std::process::exit(2);
            };
            let Some(role_raw) = flag_value(&args, "--role") else {
                eprintln!("register requires --role");
                std::process::exit(2);
            };
            let Some(role) = Role::parse(&role_raw) else {
                eprintln!("unknown role: {role_raw}");
                std::process::exit(2);
            };
            let password = match flag_value(&args, "--password") {
                Some(p) => p,
                None => prompt_password()?,
            };
            let client = AuthClient::new(&auth_url(&args))?;
            let created = client.register(&NewUser { username, email, password, role }).await?;
            println!("created user {} (id {})", created.username, created.id);
        }
        "whoami" => {
            if !print_identity(&guard) {
                std::process::exit(1);
            }
        }
        "check" => {
            let Some(raw) = args.first() else {
                eprintln!("check requires a capability");
                print_usage(&program);
                std::process::exit(2);
            };
            let Some(capability) = Capability::parse(raw) else {
                eprintln!("unknown capability: {raw}");
                std::process::exit(2);
            };
            match guard.check(capability) {
                Ok(identity) => println!("granted: {} as {}", capability, identity.role),
                Err(DeniedReason::Unauthenticated) => {
                    println!("denied: unauthenticated");
                    navigator.navigate(guard.config().login_route.as_str());
                    std::process::exit(1);
                }
                Err(DeniedReason::Forbidden) => {
                    println!("denied: forbidden");
                    navigator.navigate(guard.config().landing_route.as_str());
                    std::process::exit(1);
                }
            }
        }
        "logout" => {
            guard.logout(&navigator);
            println!("logged out");
        }
        other => {
            eprintln!("unknown command: {other}");
            print_usage(&program);
            std::process::exit(2);
        }
    }

    Ok(())
}
