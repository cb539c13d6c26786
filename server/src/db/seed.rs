use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use super::models::NewUser;
use super::Database;
use crate::config::BootstrapConfig;
use crate::error::Result;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bob", "Charlie", "Diana", "Eve", "Frank", "Grace", "Henry", "Iris", "Jack", "Kate",
    "Liam", "Maya", "Noah", "Olivia", "Peter", "Quinn", "Rachel", "Sam", "Tara", "Uma", "Victor",
    "Wendy", "Xavier", "Yara", "Zach",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Martinez",
    "Lopez", "Wilson", "Anderson", "Thomas", "Taylor", "Moore", "Jackson", "Martin", "Lee",
    "Thompson", "White", "Harris", "Clark",
];

const GENRES: &[&str] = &[
    "Mystery", "SciFi", "Fantasy", "Romance", "Thriller", "Horror", "Historical", "Technical",
    "Poetry", "Drama",
];

const TOPICS: &[&str] = &[
    "Dragons", "Space", "Magic", "Detectives", "Time Travel", "Robots", "Pirates", "Mythology",
    "the Ocean", "the Mountain", "the Desert", "the Castle", "the Laboratory",
];

const SECRET_PREFIXES: &[&str] = &[
    "The hidden truth about",
    "The secret behind",
    "What nobody knows about",
    "The untold story of",
    "The confidential details about",
];

const SECRET_SUFFIXES: &[&str] = &[
    "the main character's true identity",
    "the ending nobody expected",
    "the hidden chapter that was removed",
    "the alternate ending",
    "the controversial plot twist",
];

const EMAIL_DOMAINS: &[&str] = &["example.com", "test.com", "demo.com", "sample.org"];

/// Fixed accounts every deployment starts with.
pub const DEFAULT_USERS: &[(&str, &str, &str, bool)] = &[
    ("admin", "pass1", "admin@mail.com", true),
    ("name1", "pass1", "mail1@mail.com", false),
    ("name2", "pass2", "mail2@mail.com", false),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub books: usize,
}

/// Writes the default accounts, `config.users` generated accounts, and
/// `config.books_per_user` books for every account. Expects empty tables.
pub async fn populate<R: Rng>(
    db: &Database,
    config: &BootstrapConfig,
    rng: &mut R,
) -> Result<SeedReport> {
    let users = db.users();
    let books = db.books();

    let mut accounts = default_accounts();
    accounts.extend(generated_accounts(config.users, rng));

    let mut titles = HashSet::new();
    let mut report = SeedReport::default();

    for account in &accounts {
        let stored = users.insert(account).await?;
        report.users += 1;

        for _ in 0..config.books_per_user {
            let title = unique_title(&mut titles, rng);
            let secret = secret_for(&title, rng);
            books.insert(&title, &secret, stored.id).await?;
            report.books += 1;
        }
    }

    log::info!(
        "Bootstrap population written: {} users, {} books",
        report.users,
        report.books
    );
    Ok(report)
}

fn default_accounts() -> Vec<NewUser> {
    DEFAULT_USERS
        .iter()
        .map(|(username, password, email, admin)| NewUser {
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
            admin: *admin,
        })
        .collect()
}

fn generated_accounts<R: Rng>(count: usize, rng: &mut R) -> Vec<NewUser> {
    let mut taken: HashSet<String> = DEFAULT_USERS
        .iter()
        .map(|(username, ..)| username.to_string())
        .collect();

    (0..count)
        .map(|_| {
            let first = FIRST_NAMES.choose(rng).copied().unwrap_or("user");
            let last = LAST_NAMES.choose(rng).copied().unwrap_or("sample");
            let base = format!("{}.{}", first.to_lowercase(), last.to_lowercase());

            let mut username = base.clone();
            let mut counter = 1;
            while taken.contains(&username) {
                username = format!("{base}{counter}");
                counter += 1;
            }
            taken.insert(username.clone());

            let domain = EMAIL_DOMAINS.choose(rng).copied().unwrap_or("example.com");
            NewUser {
                email: format!("{username}@{domain}"),
                password: format!("pass{}", rng.gen_range(1000..10000)),
                admin: rng.gen_range(0..100) < 10,
                username,
            }
        })
        .collect()
}

fn unique_title<R: Rng>(taken: &mut HashSet<String>, rng: &mut R) -> String {
    let genre = GENRES.choose(rng).copied().unwrap_or("Mystery");
    let topic = TOPICS.choose(rng).copied().unwrap_or("Dragons");
    let base = match rng.gen_range(0..5) {
        0 => format!("The {genre} of {topic}"),
        1 => format!("Tales of {topic}"),
        2 => format!("Chronicles of {topic}"),
        3 => format!("{genre} in {topic}"),
        _ => format!("Secrets of {topic}"),
    };

    let mut title = base.clone();
    let mut counter = 2;
    while taken.contains(&title) {
        title = format!("{base} {counter}");
        counter += 1;
    }
    taken.insert(title.clone());
    title
}

fn secret_for<R: Rng>(title: &str, rng: &mut R) -> String {
    let prefix = SECRET_PREFIXES.choose(rng).copied().unwrap_or("The secret behind");
    let suffix = SECRET_SUFFIXES.choose(rng).copied().unwrap_or("the alternate ending");
    format!("{prefix} '{title}': {suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generated_usernames_are_unique() {
        let mut rng = StdRng::seed_from_u64(7);
        let accounts = generated_accounts(200, &mut rng);
        let names: HashSet<_> = accounts.iter().map(|a| a.username.as_str()).collect();
        assert_eq!(names.len(), 200);
        assert!(!names.contains("admin"));
    }

    #[test]
    fn titles_never_repeat() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut taken = HashSet::new();
        for _ in 0..500 {
            unique_title(&mut taken, &mut rng);
        }
        assert_eq!(taken.len(), 500);
    }

    #[actix_web::test]
    async fn populate_writes_defaults_and_books() {
        let db = Database::in_memory().await.unwrap();
        db.init_schema().await.unwrap();
        let config = BootstrapConfig {
            users: 4,
            books_per_user: 2,
            populate_on_start: true,
        };

        let report = populate(&db, &config, &mut StdRng::seed_from_u64(3))
            .await
            .unwrap();
        assert_eq!(report.users, 7);
        assert_eq!(report.books, 14);

        let users = db.users().list().await.unwrap();
        assert_eq!(users[0].username, "admin");
        assert!(users[0].admin);
        assert_eq!(users[1].password, "pass1");
        assert_eq!(db.books().list().await.unwrap().len(), 14);
    }
}
