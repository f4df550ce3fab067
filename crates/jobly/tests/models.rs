//! Model operations against a live database.
//!
//! Each test runs inside its own transaction on a throwaway schema, so nothing is
//! left behind. Tests are skipped when `DATABASE_URL` is not set.

use jobly::models::{Company, CompanyFilter, Job, JobFilter, NewCompany, NewJob, SCHEMA_SQL};
use jobly::{FilterCriteria, GenericClient, JoblyError, JoblyResult, SqlValue, UpdatePayload};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio_postgres::{Client, NoTls, Transaction};

async fn try_connect(test: &str) -> JoblyResult<Option<Client>> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test}");
            return Ok(None);
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let (client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .map_err(JoblyError::from_db_error)?;
    tokio::spawn(async move {
        let _ = connection.await;
    });
    Ok(Some(client))
}

/// Open a transaction on a fresh schema holding the jobly tables and seed rows.
async fn seeded(client: &mut Client) -> JoblyResult<Transaction<'_>> {
    let tx = client.transaction().await.map_err(JoblyError::from_db_error)?;
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX_EPOCH")
        .as_nanos();
    let schema = format!("jobly_test_{}_{}", std::process::id(), nanos);
    tx.batch_execute(&format!(
        "CREATE SCHEMA {schema}; SET LOCAL search_path TO {schema};"
    ))
    .await
    .map_err(JoblyError::from_db_error)?;
    tx.batch_execute(SCHEMA_SQL)
        .await
        .map_err(JoblyError::from_db_error)?;
    tx.batch_execute(
        "INSERT INTO companies (handle, name, num_employees, description, logo_url) VALUES
           ('c1', 'C1', 1, 'Desc1', 'http://c1.img'),
           ('c2', 'C2', 2, 'Desc2', 'http://c2.img'),
           ('c3', 'C3', 3, 'Desc3', 'http://c3.img');
         INSERT INTO jobs (title, salary, equity, company_handle) VALUES
           ('Job1', 100, 0.1, 'c1'),
           ('Job2', 200, 0.2, 'c1'),
           ('Job3', 300, 0, 'c1'),
           ('Job4', NULL, NULL, 'c1');",
    )
    .await
    .map_err(JoblyError::from_db_error)?;
    Ok(tx)
}

async fn job_id(conn: &impl GenericClient, title: &str) -> JoblyResult<i32> {
    let jobs = Job::find_all(conn, &JobFilter::default().title(title)).await?;
    jobs.into_iter()
        .find(|j| j.title == title)
        .map(|j| j.id)
        .ok_or_else(|| JoblyError::not_found(format!("No job titled {title}")))
}

#[tokio::test]
async fn company_lifecycle() -> JoblyResult<()> {
    let Some(mut client) = try_connect("company_lifecycle").await? else {
        return Ok(());
    };
    let mut tx = seeded(&mut client).await?;

    let new = NewCompany {
        handle: "new".into(),
        name: "New".into(),
        description: "New Description".into(),
        num_employees: Some(1),
        logo_url: Some("http://new.img".into()),
    };
    let created = Company::create(&tx, &new).await?;
    assert_eq!(created.handle, "new");
    assert_eq!(created.num_employees, Some(1));

    {
        let sp = tx.transaction().await.map_err(JoblyError::from_db_error)?;
        let err = Company::create(&sp, &new).await.unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Duplicate company: new");
        sp.rollback().await.map_err(JoblyError::from_db_error)?;
    }

    {
        let sp = tx.transaction().await.map_err(JoblyError::from_db_error)?;
        let same_name = NewCompany {
            handle: "other".into(),
            ..new.clone()
        };
        let err = Company::create(&sp, &same_name).await.unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Duplicate company name: New");
        sp.rollback().await.map_err(JoblyError::from_db_error)?;
    }

    let all = Company::find_all(&tx, &CompanyFilter::default()).await?;
    let handles: Vec<_> = all.iter().map(|c| c.handle.as_str()).collect();
    assert_eq!(handles, ["c1", "c2", "c3", "new"]);

    let payload = UpdatePayload::new()
        .set("name", "New2")
        .set("numEmployees", 10)
        .set("logoUrl", SqlValue::Null);
    let updated = Company::update(&tx, "new", &payload).await?;
    assert_eq!(updated.name, "New2");
    assert_eq!(updated.num_employees, Some(10));
    assert_eq!(updated.logo_url, None);
    assert_eq!(updated.description, "New Description");

    Company::remove(&tx, "new").await?;
    let err = Company::get(&tx, "new").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Not found: No company: new");

    tx.rollback().await.map_err(JoblyError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn company_filters() -> JoblyResult<()> {
    let Some(mut client) = try_connect("company_filters").await? else {
        return Ok(());
    };
    let tx = seeded(&mut client).await?;

    let by_name = Company::find_all(&tx, &CompanyFilter::default().name("1")).await?;
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].handle, "c1");

    let case_insensitive = Company::find_all(&tx, &CompanyFilter::default().name("c")).await?;
    assert_eq!(case_insensitive.len(), 3);

    let range = CompanyFilter::from_query_pairs([("minEmployees", "2"), ("maxEmployees", "3")])?;
    let in_range = Company::find_all(&tx, &range).await?;
    let handles: Vec<_> = in_range.iter().map(|c| c.handle.as_str()).collect();
    assert_eq!(handles, ["c2", "c3"]);

    let inverted = CompanyFilter::default().min_employees(3).max_employees(1);
    let err = Company::find_all(&tx, &inverted).await.unwrap_err();
    assert_eq!(err.status_code(), 400);

    tx.rollback().await.map_err(JoblyError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn company_detail_lists_jobs() -> JoblyResult<()> {
    let Some(mut client) = try_connect("company_detail_lists_jobs").await? else {
        return Ok(());
    };
    let tx = seeded(&mut client).await?;

    let detail = Company::get(&tx, "c1").await?;
    assert_eq!(detail.company.name, "C1");
    let titles: Vec<_> = detail.jobs.iter().map(|j| j.title.as_str()).collect();
    assert_eq!(titles, ["Job1", "Job2", "Job3", "Job4"]);

    let empty = Company::get(&tx, "c2").await?;
    assert!(empty.jobs.is_empty());

    tx.rollback().await.map_err(JoblyError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn removing_company_cascades_to_jobs() -> JoblyResult<()> {
    let Some(mut client) = try_connect("removing_company_cascades_to_jobs").await? else {
        return Ok(());
    };
    let tx = seeded(&mut client).await?;

    Company::remove(&tx, "c1").await?;
    let jobs = Job::find_all(&tx, &JobFilter::default()).await?;
    assert!(jobs.is_empty());

    let err = Company::remove(&tx, "c1").await.unwrap_err();
    assert!(err.is_not_found());

    tx.rollback().await.map_err(JoblyError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn job_lifecycle() -> JoblyResult<()> {
    let Some(mut client) = try_connect("job_lifecycle").await? else {
        return Ok(());
    };
    let mut tx = seeded(&mut client).await?;

    let new = NewJob {
        title: "Test".into(),
        salary: Some(100),
        equity: Some("0.1".into()),
        company_handle: "c2".into(),
    };
    let job = Job::create(&tx, &new).await?;
    assert_eq!(job.title, "Test");
    assert_eq!(job.equity, Some("0.1".parse().unwrap()));
    assert_eq!(job.company_handle, "c2");

    let no_equity = NewJob {
        equity: Some(String::new()),
        title: "Test2".into(),
        ..new.clone()
    };
    assert_eq!(Job::create(&tx, &no_equity).await?.equity, None);

    {
        let sp = tx.transaction().await.map_err(JoblyError::from_db_error)?;
        let orphan = NewJob {
            company_handle: "nope".into(),
            ..new.clone()
        };
        let err = Job::create(&sp, &orphan).await.unwrap_err();
        assert_eq!(err.to_string(), "Not found: No company: nope");
        sp.rollback().await.map_err(JoblyError::from_db_error)?;
    }

    let fetched = Job::get(&tx, job.id).await?;
    assert_eq!(fetched, job);

    let payload = UpdatePayload::new()
        .set("title", "Renamed")
        .set("salary", 500)
        .set("companyHandle", "c3");
    let updated = Job::update(&tx, job.id, &payload).await?;
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.salary, Some(500));
    assert_eq!(updated.company_handle, "c2");

    Job::remove(&tx, job.id).await?;
    let err = Job::get(&tx, job.id).await.unwrap_err();
    assert_eq!(err.to_string(), format!("Not found: No job: {}", job.id));

    let err = Job::update(&tx, job.id, &UpdatePayload::new().set("title", "x"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    tx.rollback().await.map_err(JoblyError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn job_filters() -> JoblyResult<()> {
    let Some(mut client) = try_connect("job_filters").await? else {
        return Ok(());
    };
    let tx = seeded(&mut client).await?;

    let all = Job::find_all(&tx, &JobFilter::default()).await?;
    assert_eq!(all.len(), 4);

    let with_equity = Job::find_all(&tx, &JobFilter::default().has_equity(true)).await?;
    let titles: Vec<_> = with_equity.iter().map(|j| j.title.as_str()).collect();
    assert_eq!(titles, ["Job1", "Job2"]);

    let filter = JobFilter::from_query_pairs([("minSalary", "150"), ("hasEquity", "true")])?;
    let titles: Vec<_> = Job::find_all(&tx, &filter)
        .await?
        .into_iter()
        .map(|j| j.title)
        .collect();
    assert_eq!(titles, ["Job2"]);

    let by_title = Job::find_all(&tx, &JobFilter::default().title("job3")).await?;
    assert_eq!(by_title.len(), 1);

    let id = job_id(&tx, "Job4").await?;
    let updated = Job::update(&tx, id, &UpdatePayload::new().set("equity", "")).await?;
    assert_eq!(updated.equity, None);

    tx.rollback().await.map_err(JoblyError::from_db_error)?;
    Ok(())
}
