//! Integration tests for the full service pipeline.
//!
//! Tests: Faucet / RecordInitializer / TransferExecutor → stores → EventBus
//!
//! Verifies:
//! - The client scenarios (fund, initialize twice, transfer, reject zero, reject overdraft)
//! - Conservation and non-negativity under concurrent transfers
//! - Exactly one winner for concurrent initialization of the same account

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use vault_core::{AccountId, DomainError};
    use vault_events::EventBus;
    use vault_ledger::{BalanceEvent, DEFAULT_SIGNATURE_FEE, LAMPORTS_PER_SOL};

    use crate::config::VaultConfig;
    use crate::error::ExecutionError;
    use crate::ledger_store::Ledger;
    use crate::record_store::RecordStore;
    use crate::services::{VaultServices, build_in_memory};

    fn setup() -> VaultServices {
        vault_observability::init_for_tests();
        build_in_memory(&VaultConfig {
            fee_lamports: DEFAULT_SIGNATURE_FEE,
            ..VaultConfig::default()
        })
    }

    fn domain(err: ExecutionError) -> DomainError {
        match err {
            ExecutionError::Domain(e) => e,
            other => panic!("expected a domain error, got {other:?}"),
        }
    }

    #[test]
    fn client_scenario_end_to_end() {
        let vault = setup();
        let signer = AccountId::new();
        let data_account = AccountId::new();
        let recipient = AccountId::new();

        // Is initialized with hello solana vault
        vault.faucet.request_airdrop(signer, 100 * LAMPORTS_PER_SOL).unwrap();
        let record = vault.initializer.initialize(data_account, "Solana Vault").unwrap();
        assert_eq!(record.label(), "Solana Vault");

        // Initializes with a different message
        let new_data_account = AccountId::new();
        vault.faucet.request_airdrop(signer, 100 * LAMPORTS_PER_SOL).unwrap();
        let message = "welcome to solana vault";
        vault.initializer.initialize(new_data_account, message).unwrap();
        let fetched = vault.initializer.fetch(&new_data_account).unwrap().unwrap();
        assert_eq!(fetched.label(), message);

        // Transfers lamports successfully
        vault.faucet.request_airdrop(signer, 100 * LAMPORTS_PER_SOL).unwrap();
        let initial_signer = vault.transfers.balance(&signer).unwrap();
        let initial_recipient = vault.transfers.balance(&recipient).unwrap();
        let amount = LAMPORTS_PER_SOL;

        vault.transfers.transfer(signer, recipient, amount).unwrap();

        let final_signer = vault.transfers.balance(&signer).unwrap();
        let final_recipient = vault.transfers.balance(&recipient).unwrap();
        let expected_signer = initial_signer - amount;
        assert!(
            expected_signer.abs_diff(final_signer) <= LAMPORTS_PER_SOL / 10,
            "signer balance should decrease by approximately the transfer amount"
        );
        assert_eq!(final_recipient, initial_recipient + amount);

        // Fails to transfer zero lamports
        vault.faucet.request_airdrop(signer, 100 * LAMPORTS_PER_SOL).unwrap();
        let err = vault.transfers.transfer(signer, recipient, 0).unwrap_err();
        assert!(err.to_string().contains("The transfer amount must be greater than 0"));

        // Fails to transfer more lamports than available
        vault.faucet.request_airdrop(signer, LAMPORTS_PER_SOL).unwrap();
        let signer_balance = vault.transfers.balance(&signer).unwrap();
        let err = vault
            .transfers
            .transfer(signer, recipient, signer_balance + LAMPORTS_PER_SOL)
            .unwrap_err();
        assert!(err.to_string().contains("Insufficient funds for the transfer"));

        // Verifies data account contents after initialization
        let data = vault.initializer.fetch(&data_account).unwrap().unwrap();
        assert_eq!(data.label(), "Solana Vault");
    }

    #[test]
    fn rejected_transfers_leave_both_balances_unchanged() {
        let vault = setup();
        let (a, b) = (AccountId::new(), AccountId::new());
        vault.faucet.request_airdrop(a, LAMPORTS_PER_SOL).unwrap();
        vault.faucet.request_airdrop(b, 3).unwrap();

        let zero = vault.transfers.transfer(a, b, 0).unwrap_err();
        let overdraft = vault.transfers.transfer(a, b, LAMPORTS_PER_SOL + 1).unwrap_err();

        assert_eq!(domain(zero), DomainError::InvalidAmount);
        assert_eq!(
            domain(overdraft),
            DomainError::insufficient_funds(LAMPORTS_PER_SOL, LAMPORTS_PER_SOL + 1)
        );
        assert_eq!(vault.ledger.balance(&a).unwrap(), LAMPORTS_PER_SOL);
        assert_eq!(vault.ledger.balance(&b).unwrap(), 3);
        assert_eq!(vault.ledger.fees_collected().unwrap(), 0);
    }

    #[test]
    fn fees_reduce_payer_only_and_supply_plus_fees_is_conserved() {
        let vault = setup();
        let (a, b) = (AccountId::new(), AccountId::new());
        vault.faucet.request_airdrop(a, 10 * LAMPORTS_PER_SOL).unwrap();
        let supply_before = vault.ledger.total_supply().unwrap();

        for _ in 0..5 {
            vault.transfers.transfer(a, b, LAMPORTS_PER_SOL).unwrap();
        }

        let fees = vault.ledger.fees_collected().unwrap();
        assert_eq!(fees, 5 * DEFAULT_SIGNATURE_FEE as u128);
        assert_eq!(vault.ledger.balance(&b).unwrap(), 5 * LAMPORTS_PER_SOL);
        assert_eq!(vault.ledger.total_supply().unwrap() + fees, supply_before);
    }

    #[test]
    fn self_transfer_is_accepted_with_no_principal_change() {
        let vault = build_in_memory(&VaultConfig::default());
        let a = AccountId::new();
        vault.faucet.request_airdrop(a, 500).unwrap();

        let receipt = vault.transfers.transfer(a, a, 200).unwrap();

        assert_eq!(receipt.payer_balance, 500);
        assert_eq!(receipt.recipient_balance, 500);
    }

    #[test]
    fn concurrent_transfers_conserve_value_and_never_overdraw() {
        let vault = Arc::new(setup());
        let accounts: Vec<AccountId> = (0..4).map(|_| AccountId::new()).collect();
        for account in &accounts {
            vault.faucet.request_airdrop(*account, 1_000_000).unwrap();
        }
        let supply_before = vault.ledger.total_supply().unwrap();

        let threads = 8;
        let barrier = Arc::new(Barrier::new(threads));
        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let vault = vault.clone();
                let accounts = accounts.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    let mut ok = 0u32;
                    for i in 0..200usize {
                        let payer = accounts[(t + i) % accounts.len()];
                        let recipient = accounts[(t + i + 1) % accounts.len()];
                        let amount = 1 + ((t * 7919 + i * 104_729) % 90_000) as u64;
                        match vault.transfers.transfer(payer, recipient, amount) {
                            Ok(_) => ok += 1,
                            Err(ExecutionError::Domain(DomainError::InsufficientFunds { .. })) => {}
                            Err(other) => panic!("unexpected error: {other:?}"),
                        }
                    }
                    ok
                })
            })
            .collect();

        let succeeded: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert!(succeeded > 0);
        let fees = vault.ledger.fees_collected().unwrap();
        assert_eq!(vault.ledger.total_supply().unwrap() + fees, supply_before);
        assert!(fees <= succeeded as u128 * DEFAULT_SIGNATURE_FEE as u128);
    }

    #[test]
    fn concurrent_initialization_of_one_owner_has_a_single_winner() {
        let vault = Arc::new(setup());
        let owner = AccountId::new();
        let threads = 16;
        let barrier = Arc::new(Barrier::new(threads));

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let vault = vault.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    vault.initializer.initialize(owner, format!("label-{t}"))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();

        assert_eq!(winners.len(), 1);
        for loser in results.iter().filter_map(|r| r.as_ref().err()) {
            assert_eq!(loser.as_domain(), Some(&DomainError::AlreadyInitialized(owner)));
        }
        let stored = vault.records.fetch(&owner).unwrap().unwrap();
        assert_eq!(&stored, winners[0]);
        assert_eq!(vault.records.len().unwrap(), 1);
    }

    #[test]
    fn committed_transfers_reach_subscribers_in_order() {
        let vault = build_in_memory(&VaultConfig::default());
        let sub = vault.bus.subscribe();
        let (a, b) = (AccountId::new(), AccountId::new());

        vault.faucet.request_airdrop(a, 100).unwrap();
        let receipt = vault.transfers.transfer(a, b, 40).unwrap();
        let _ = vault.transfers.transfer(a, b, 1_000);

        let published = sub.drain();
        assert_eq!(published.len(), 2);
        let sequences: Vec<u64> = published.iter().map(|e| e.sequence_number()).collect();
        assert_eq!(sequences, vec![1, 2]);

        match published[1].decode::<BalanceEvent>().unwrap() {
            BalanceEvent::Transferred(e) => {
                assert_eq!(e.transfer_id, receipt.transfer_id);
                assert_eq!((e.payer, e.recipient, e.amount), (a, b, 40));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn configured_label_capacity_is_enforced() {
        let vault = build_in_memory(&VaultConfig {
            max_label_len: 5,
            ..VaultConfig::default()
        });

        let err = vault
            .initializer
            .initialize(AccountId::new(), "Solana Vault")
            .unwrap_err();

        assert_eq!(domain(err), DomainError::LabelTooLong { len: 12, max: 5 });
    }
}
