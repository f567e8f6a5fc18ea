/// dashboard - portfolio aggregates over a mixed book of collateral
use collateral_registry_rs::{
    dashboard, ActingUser, Client, ContractSyncRecord, Guarantor, LinkRequest, Money,
    NewCollateral, Registry, Role, SafeTimeProvider, TimeSource, Uuid,
};
use chrono::{NaiveDate, TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== portfolio dashboard ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(),
    ));

    let registry = &mut Registry::with_standard_catalog();
    let editor = ActingUser::new(Uuid::new_v4(), "agent", [Role::Editor]);
    let tech = ActingUser::new(Uuid::new_v4(), "batch", [Role::Tech]);
    let viewer = ActingUser::new(Uuid::new_v4(), "direction", [Role::Viewer]);

    let client = registry.add_client(&editor, Client::new("CL-0001", "Ndiaye", "Fatou"))?;
    let guarantor = registry.register_guarantor(
        &editor,
        Guarantor::new("Diallo", "Amadou", NaiveDate::from_ymd_opt(1980, 3, 14).unwrap()),
        &time,
    )?;

    // loans arrive from the core-banking feed
    for (loan_number, granted) in [("PRET-001", 3_000_000), ("PRET-002", 8_000_000)] {
        registry.sync_contract(
            &tech,
            ContractSyncRecord {
                loan_number: loan_number.to_string(),
                amount_granted: Money::from_major(granted),
                effective_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
                maturity_date: None,
                status: "active".to_string(),
                client_matricule: "CL-0001".to_string(),
                client_name: Some("Fatou Ndiaye".to_string()),
                manager_code: None,
                branch_code: None,
            },
            &time,
        )?;
    }

    // one pledged surety, one expired deposit
    let pledged = registry.register_collateral(
        &editor,
        NewCollateral {
            name: "Titre foncier 1204".to_string(),
            description: None,
            location: None,
            type_id: registry.type_by_code("CAU-HYP").unwrap().id,
            guarantor_id: guarantor,
            client_id: Some(client),
            declared_value: Money::from_major(10_000_000),
            expires_on: None,
        },
        &time,
    )?;
    registry.register_collateral(
        &editor,
        NewCollateral {
            name: "Dépôt à terme".to_string(),
            description: None,
            location: None,
            type_id: registry.type_by_code("GAR-DEP").unwrap().id,
            guarantor_id: guarantor,
            client_id: Some(client),
            declared_value: Money::from_major(2_000_000),
            expires_on: NaiveDate::from_ymd_opt(2025, 1, 1),
        },
        &time,
    )?;

    let covered = registry.contract_by_number("PRET-001").unwrap().id;
    registry.link_contract(
        &editor,
        pledged,
        covered,
        LinkRequest::Amount(Money::from_major(3_000_000)),
        &time,
    )?;

    let stats = dashboard::summarize(registry, &viewer, time.now().date_naive())?;
    println!("total collateral:     {}", stats.total_collateral);
    println!("expired:              {}", stats.expired);
    println!("unencumbered:         {}", stats.unencumbered);
    println!("uncovered loans:      {}", stats.uncovered_loans);
    println!("shared collateral:    {}", stats.shared_collateral);
    println!("eligible for release: {}", stats.eligible_for_release);
    println!("\nby status:");
    for (status, count) in &stats.per_status {
        println!("  {:<20} {}", status.as_str(), count);
    }

    // the full registry state serializes for persistence
    println!("\nstate snapshot: {} bytes", registry.to_json()?.len());

    Ok(())
}
