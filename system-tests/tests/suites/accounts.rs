// system-tests/tests/suites/accounts.rs
// ============================================================================
// Module: Accounts Contract Tests
// Description: Accounts list checks through the raw and async clients.
// Purpose: Ensure `api/accounts.yaml` and the accounts client agree.
// Dependencies: contract-probe-accounts, contract-probe-core, system-tests, tokio
// ============================================================================

//! ## Overview
//! Accounts list checks through the raw and async clients.
//! The harness (and its blocking readiness poll) is set up before the
//! current-thread runtime is built, so no blocking client runs inside it.
//! Invariants:
//! - The async producer yields exactly one list and then completes.
//! - Every account carries a non-empty id, name, and currency.

use std::error::Error;

use contract_probe_accounts::Account;
use contract_probe_accounts::AccountsClient;
use contract_probe_core::expect_single_future;
use system_tests::scenarios;
use tokio::runtime::Builder;

use crate::helpers::suite;
use crate::helpers::timeouts::DEFAULT_CHECK_TIMEOUT;
use crate::helpers::timeouts::resolve_timeout;

#[allow(clippy::ptr_arg, reason = "The one-shot check receives the produced value by reference.")]
fn every_account_is_complete(accounts: &Vec<Account>) -> Result<(), String> {
    if accounts.is_empty() {
        return Err("account list is empty".to_string());
    }
    for (index, account) in accounts.iter().enumerate() {
        for (field, value) in
            [("id", &account.id), ("name", &account.name), ("currency", &account.currency)]
        {
            if value.is_empty() {
                return Err(format!("account {index} has empty {field}"));
            }
        }
    }
    Ok(())
}

#[test]
fn accounts_list_conforms() -> Result<(), Box<dyn Error>> {
    let harness = suite::accounts()?;
    let interaction = harness.context().run(&scenarios::list_accounts())?;
    interaction.expect_status(200)?.expect_non_null_body()?;
    Ok(())
}

#[test]
fn accounts_client_yields_one_complete_list() -> Result<(), Box<dyn Error>> {
    let harness = suite::accounts()?;
    let timeout = resolve_timeout(DEFAULT_CHECK_TIMEOUT)?;
    // Async connections belong to the runtime that opened them; keep the client local to it.
    let client = AccountsClient::new(harness.backend().base_url())?;
    let runtime = Builder::new_current_thread().enable_all().build()?;
    let accounts = runtime.block_on(expect_single_future(
        client.get_accounts(),
        timeout,
        every_account_is_complete,
    ))?;
    if accounts.is_empty() {
        return Err("expected at least one account".into());
    }
    Ok(())
}

#[test]
fn unknown_account_is_not_found() -> Result<(), Box<dyn Error>> {
    let harness = suite::accounts()?;
    let interaction = harness.context().run(&scenarios::show_account_not_found("acc-missing")?)?;
    interaction.expect_status(404)?.expect_field_eq("code", "NOT_FOUND")?;
    Ok(())
}

#[test]
fn incomplete_account_is_rejected() {
    let accounts = vec![
        Account {
            id: "acc-1001".to_string(),
            name: "Operating".to_string(),
            balance: 1520.75,
            currency: "EUR".to_string(),
        },
        Account {
            id: "acc-1002".to_string(),
            name: "Savings".to_string(),
            balance: 98000.0,
            currency: String::new(),
        },
    ];
    assert_eq!(
        every_account_is_complete(&accounts),
        Err("account 1 has empty currency".to_string())
    );
    assert!(every_account_is_complete(&Vec::new()).is_err());
}
