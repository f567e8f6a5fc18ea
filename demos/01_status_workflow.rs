/// status workflow - legal lifecycle of a collateral with the audit trail
use collateral_registry_rs::{
    ActingUser, CollateralStatus, Guarantor, Money, NewCollateral, Registry, Role,
    SafeTimeProvider, TimeSource, Uuid,
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== collateral status workflow ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();

    let registry = &mut Registry::with_standard_catalog();
    let editor = ActingUser::new(Uuid::new_v4(), "agent", [Role::Editor]);
    let legal = ActingUser::new(Uuid::new_v4(), "service juridique", [Role::Legal]);

    let guarantor = registry.register_guarantor(
        &editor,
        Guarantor::new("Sow", "Ousmane", NaiveDate::from_ymd_opt(1975, 11, 2).unwrap()),
        &time,
    )?;
    let collateral = registry.register_collateral(
        &editor,
        NewCollateral {
            name: "Immeuble R+2, avenue Bourguiba".to_string(),
            description: None,
            location: None,
            type_id: registry.type_by_code("GAR-HYP").unwrap().id,
            guarantor_id: guarantor,
            client_id: None,
            declared_value: Money::from_major(25_000_000),
            expires_on: None,
        },
        &time,
    )?;

    println!("1. normal servicing");
    println!("   status: {}", registry.get_collateral(collateral)?.status.as_str());

    // the legal gate: an editor may not move a collateral into contention
    println!("\n2. unauthorized attempt");
    match registry.change_status(&editor, collateral, CollateralStatus::Contentious, None, vec![], &time) {
        Ok(_) => println!("   error: editor should not change status!"),
        Err(e) => println!("   ✓ rejected: {}", e),
    }

    // the legal department escalates after a payment default
    println!("\n3. escalation to contentious");
    controller.advance(Duration::days(90));
    registry.change_status(
        &legal,
        collateral,
        CollateralStatus::Contentious,
        Some("défaut de paiement constaté".to_string()),
        vec!["garanties/justificatifs/mise_en_demeure.pdf".to_string()],
        &time,
    )?;
    println!("   status: {}", registry.get_collateral(collateral)?.status.as_str());

    println!("\n4. realization and release");
    controller.advance(Duration::days(60));
    registry.change_status(&legal, collateral, CollateralStatus::Realization, None, vec![], &time)?;
    controller.advance(Duration::days(30));
    registry.change_status(&legal, collateral, CollateralStatus::Released, None, vec![], &time)?;
    println!("   status: {}", registry.get_collateral(collateral)?.status.as_str());

    // an invalid move is refused whole, nothing is recorded
    println!("\n5. terminal state");
    match registry.change_status(&legal, collateral, CollateralStatus::Contentious, None, vec![], &time) {
        Ok(_) => println!("   error: released is terminal!"),
        Err(e) => println!("   ✓ rejected: {}", e),
    }

    println!("\n6. audit trail");
    for record in registry.history().for_collateral(collateral) {
        println!(
            "   {} {} -> {}{}",
            record.timestamp.format("%Y-%m-%d"),
            record.previous.as_str(),
            record.next.as_str(),
            record
                .comment
                .as_deref()
                .map(|c| format!("  ({c})"))
                .unwrap_or_default(),
        );
    }

    Ok(())
}
