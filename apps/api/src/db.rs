use anyhow::Result;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{Executor, PgPool};
use tracing::info;
use uuid::Uuid;

const SCHEMA: &str = include_str!("../db/schema.sql");

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Applies the schema and seeds the job board when it is empty.
pub async fn bootstrap(pool: &PgPool) -> Result<()> {
    pool.execute(SCHEMA).await?;

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs")
        .fetch_one(pool)
        .await?;
    if count == 0 {
        info!("Seeding default job data...");
        seed_jobs(pool).await?;
    }

    info!("Database initialized");
    Ok(())
}

struct SeedJob {
    company: &'static str,
    role: &'static str,
    title: &'static str,
    jd_text: &'static str,
    must: &'static [&'static str],
    nice: &'static [&'static str],
    min_exp: f64,
    location: &'static str,
}

const SEED_JOBS: &[SeedJob] = &[
    SeedJob {
        company: "Google",
        role: "UI/UX Designer",
        title: "Product Designer",
        jd_text: "Design user-centric experiences using Figma, wireframes, prototyping, \
                  usability testing, and design systems.",
        must: &[
            "figma",
            "wireframes",
            "prototyping",
            "usability testing",
            "design systems",
        ],
        nice: &[
            "user research",
            "stakeholder interviews",
            "component libraries",
        ],
        min_exp: 2.0,
        location: "Bengaluru",
    },
    SeedJob {
        company: "Microsoft",
        role: "Frontend Engineer",
        title: "Frontend Dev (React)",
        jd_text: "Build performant web apps using React, TypeScript, Next.js, Tailwind CSS \
                  and testing.",
        must: &["react", "typescript", "next.js", "html", "css"],
        nice: &["tailwind", "jest", "playwright"],
        min_exp: 2.0,
        location: "Hyderabad",
    },
];

async fn seed_jobs(pool: &PgPool) -> Result<()> {
    for seed in SEED_JOBS {
        let job_id = Uuid::new_v4();
        let title = format!("{} - {} ({})", seed.company, seed.title, seed.role);
        let must: Vec<String> = seed.must.iter().map(|s| s.to_string()).collect();
        let nice: Vec<String> = seed.nice.iter().map(|s| s.to_string()).collect();

        sqlx::query(
            "INSERT INTO jobs (id, title, jd_text, must_have, nice_to_have, min_exp_years, \
             location, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(job_id)
        .bind(&title)
        .bind(seed.jd_text)
        .bind(Json(&must))
        .bind(Json(&nice))
        .bind(seed.min_exp)
        .bind(seed.location)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        sqlx::query("INSERT INTO job_meta (job_id, company, role) VALUES ($1, $2, $3)")
            .bind(job_id)
            .bind(seed.company)
            .bind(seed.role)
            .execute(pool)
            .await?;
    }
    Ok(())
}
