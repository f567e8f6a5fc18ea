/// quick start - register a collateral and pledge it to a loan
use collateral_registry_rs::{
    ActingUser, Client, Guarantor, LinkRequest, LoanContract, Money, NewCollateral, Registry, Role,
    SafeTimeProvider, TimeSource, Uuid,
};
use chrono::NaiveDate;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::System);
    let registry = &mut Registry::with_standard_catalog();
    let editor = ActingUser::new(Uuid::new_v4(), "agent", [Role::Editor]);

    // the borrowing client and the guarantor backing the asset
    let client = registry.add_client(&editor, Client::new("CL-0001", "Ndiaye", "Fatou"))?;
    let guarantor = registry.register_guarantor(
        &editor,
        Guarantor::new("Diallo", "Amadou", NaiveDate::from_ymd_opt(1980, 3, 14).unwrap()),
        &time,
    )?;

    // a mortgage-backed surety: 70% weighting, 10,000,000 declared
    let collateral = registry.register_collateral(
        &editor,
        NewCollateral {
            name: "Titre foncier 1204".to_string(),
            description: None,
            location: Some("Dakar, Plateau".to_string()),
            type_id: registry.type_by_code("CAU-HYP").unwrap().id,
            guarantor_id: guarantor,
            client_id: Some(client),
            declared_value: Money::from_major(10_000_000),
            expires_on: None,
        },
        &time,
    )?;

    let item = registry.get_collateral(collateral)?;
    println!("registered {} (real value {})", item.reference, item.real_value);

    // pledge 3,000,000 of the weighted value to a loan
    let contract = registry.add_contract(
        &editor,
        LoanContract {
            id: Uuid::new_v4(),
            loan_number: "PRET-001".to_string(),
            amount_granted: Money::from_major(5_000_000),
            effective_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            maturity_date: None,
            status: "active".to_string(),
            client_matricule: "CL-0001".to_string(),
            client_name: None,
            manager_code: None,
            branch_code: None,
            synced_at: None,
        },
    )?;
    registry.link_contract(
        &editor,
        collateral,
        contract,
        LinkRequest::Amount(Money::from_major(3_000_000)),
        &time,
    )?;

    println!("utilized:  {}", registry.utilized_amount(collateral)?);
    println!("remaining: {}", registry.remaining_amount(collateral)?);
    println!("usage:     {}", registry.utilization_percent(collateral)?);

    Ok(())
}
