//! the bouncer: a synchronous client that plays one game against the
//! server, running the admission policy against each arriving patron.

use berghain::error::ClientError;
use berghain::policy::{Goal, Goals, PolicyModel};
use berghain::Attrs;
use clap::Parser;
use serde::Deserialize;

#[derive(Parser)]
#[command(about = "Berghain challenge bouncer client")]
struct Args {
    /// use http instead of https
    #[arg(short = 'i', long = "insecure")]
    insecure: bool,
    /// server host[:port]
    #[arg(short = 'H', long = "host", default_value = "localhost:8124")]
    host: String,
    /// connect over ipv6
    #[arg(short = '6', long = "ipv6")]
    ipv6: bool,
    /// reuse an existing user id instead of creating a new one
    #[arg(short = 'u', long = "user")]
    user: Option<String>,
    /// game type to request
    #[arg(short = 't', long = "type", default_value_t = 0)]
    game_type: i32,
}

#[derive(Deserialize)]
struct NewUserResponse {
    uuid: String,
}

#[derive(Deserialize)]
struct NewGameResponse {
    id: String,
}

#[derive(Deserialize)]
struct ParamsResponse {
    p: Vec<f64>,
    #[serde(rename = "Q")]
    q: Vec<f64>,
    goals: Vec<Vec<u32>>,
}

#[derive(Deserialize)]
struct ProcessPersonResponse {
    status: String,
    count: u32,
    next: Option<u32>,
}

struct Session {
    client: reqwest::blocking::Client,
    base: String,
}

impl Session {
    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base, path);
        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| ClientError::NetworkFailure(e.to_string()))?;
        let text = resp.text().map_err(|e| ClientError::NetworkFailure(e.to_string()))?;
        if text.contains("\"error\"") {
            return Err(ClientError::NetworkFailure(format!("server returned an error: {}", text)));
        }
        serde_json::from_str(&text).map_err(|e| ClientError::ParseFailure(format!("{}: {}", e, text)))
    }
}

fn build_base(args: &Args) -> String {
    let scheme = if args.insecure { "http" } else { "https" };
    let host = if args.ipv6 && !args.host.starts_with('[') {
        format!("[{}]", args.host)
    } else {
        args.host.clone()
    };
    format!("{}://{}", scheme, host)
}

fn goals_from_params(params: &ParamsResponse) -> Result<Vec<Goal>, ClientError> {
    params
        .goals
        .iter()
        .map(|words| {
            berghain::goal::GoalProgram::from_words(words)
                .ok()
                .and_then(|g| g.as_simple_quota())
                .map(|(attr, num)| Goal { attr, num })
                .ok_or_else(|| ClientError::ParseFailure("goal is not a simple quota".into()))
        })
        .collect()
}

fn dump_and_exit(goals: &Goals, game_id: &str, person_id: u32, err: ClientError) -> ! {
    eprintln!("exit. goal state:");
    for g in &goals.goals {
        eprintln!("  attr {}: remain {}", g.attr, g.num);
    }
    eprintln!("total space: {}", goals.space);
    eprintln!("game id: {}", game_id);
    eprintln!("current person id: {}", person_id);
    eprintln!("error: {}", err);
    std::process::exit(1);
}

fn main() {
    berghain::init_logging();
    let args = Args::parse();
    let base = build_base(&args);
    let session = Session {
        client: reqwest::blocking::Client::new(),
        base,
    };

    let user_uuid = match &args.user {
        Some(u) => u.clone(),
        None => match session.get_json::<NewUserResponse>("/new-user", &[("name", "bouncer".to_string())]) {
            Ok(resp) => resp.uuid,
            Err(e) => {
                eprintln!("failed to create user: {}", e);
                std::process::exit(1);
            }
        },
    };

    let game_id = match session.get_json::<NewGameResponse>(
        "/new-game",
        &[("user", user_uuid), ("type", args.game_type.to_string())],
    ) {
        Ok(resp) => resp.id,
        Err(e) => {
            eprintln!("failed to create game: {}", e);
            std::process::exit(1);
        }
    };

    let params = match session.get_json::<ParamsResponse>("/params", &[("type", args.game_type.to_string())]) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("failed to fetch params: {}", e);
            std::process::exit(1);
        }
    };

    let model = PolicyModel {
        p: params.p.clone(),
        corr: params.q.clone(),
    };
    let goal_list = match goals_from_params(&params) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("failed to parse goals: {}", e);
            std::process::exit(1);
        }
    };

    let mut goals = Goals::new(goal_list, berghain::ACCEPTED_LIMIT as i64);
    let mut person_id: u32 = 0;
    let mut first = true;
    let mut verdict = false;

    loop {
        let mut query = vec![("game", game_id.clone()), ("person", person_id.to_string())];
        if !first {
            query.push(("verdict", verdict.to_string()));
        }

        let resp: ProcessPersonResponse = match session.get_json("/process-person", &query) {
            Ok(r) => r,
            Err(e) => dump_and_exit(&goals, &game_id, person_id, e),
        };

        if resp.status != "running" {
            log::info!("game {}: {}", game_id, resp.status);
            println!("final status: {}", resp.status);
            break;
        }

        let expected = if first { 0 } else { person_id + 1 };
        if resp.count != expected {
            dump_and_exit(
                &goals,
                &game_id,
                person_id,
                ClientError::ParseFailure(format!("expected count {}, got {}", expected, resp.count)),
            );
        }

        person_id = resp.count;
        first = false;

        let patron: Attrs = match resp.next {
            Some(n) => n,
            None => dump_and_exit(
                &goals,
                &game_id,
                person_id,
                ClientError::ParseFailure("running status with no pending patron".into()),
            ),
        };
        verdict = goals.decide(patron, &model);
        if verdict {
            goals.accept(patron);
        }
    }
}
