//! The wallet side of the client: what the browser world calls the injected
//! provider. A wallet is asked for access, hands back the connected account
//! and a contract handle bound to it, and is watched for account or network
//! changes.

use crate::{
    contract::{
        FuelGameContract,
        GameContract,
    },
    errors::{
        ClientError,
        ClientResult,
    },
    wallets::{
        self,
        WalletDescriptor,
    },
};
use fuels::{
    accounts::{
        ViewOnlyAccount,
        wallet::Wallet,
    },
    prelude::Provider,
    types::{
        Address,
        ContractId,
    },
};
use std::{
    fmt,
    time::{
        Duration,
        SystemTime,
    },
};
use tokio::{
    sync::OnceCell,
    time::{
        self,
        Interval,
        MissedTickBehavior,
    },
};
use tracing::{
    debug,
    info,
};

const DEFAULT_SAFE_SCRIPT_GAS_LIMIT: u64 = 29_000_000;

/// The user's answer to the unlock (permission) prompt.
#[derive(Clone, Eq, PartialEq)]
pub enum Unlock {
    Password(String),
    Declined,
}

impl fmt::Debug for Unlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unlock::Password(_) => f.write_str("Password(***)"),
            Unlock::Declined => f.write_str("Declined"),
        }
    }
}

/// A connected account together with the contract handle bound to it.
///
/// Holding both in one value keeps the handle from outliving the account.
pub struct Connection<C> {
    pub account: Address,
    pub contract: C,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Observation {
    pub account_stamp: Option<SystemTime>,
    pub chain_id: Option<u64>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WalletEvent {
    AccountsChanged,
    ChainChanged,
}

pub trait InjectedWallet {
    type Contract: GameContract;

    fn label(&self) -> &str;

    /// Asks for account access and binds the contract at `contract_id`.
    fn connect(
        &self,
        unlock: Unlock,
        contract_id: ContractId,
    ) -> impl Future<Output = ClientResult<Connection<Self::Contract>>>;

    fn observe(&self) -> impl Future<Output = Observation>;
}

pub fn account_hex(account: &Address) -> String {
    let bytes: &[u8; 32] = account;
    format!("0x{}", hex::encode(bytes))
}

/// `0x1234...abcd`
pub fn short_account(account: &Address) -> String {
    let full = account_hex(account);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// A forc-wallet keystore reached through a Fuel node.
pub struct KeystoreWallet {
    descriptor: WalletDescriptor,
    rpc_url: String,
    expected_chain_id: Option<u64>,
    provider: OnceCell<Provider>,
}

impl KeystoreWallet {
    pub fn new(
        descriptor: WalletDescriptor,
        rpc_url: impl Into<String>,
        expected_chain_id: Option<u64>,
    ) -> Self {
        Self {
            descriptor,
            rpc_url: rpc_url.into(),
            expected_chain_id,
            provider: OnceCell::new(),
        }
    }

    async fn provider(&self) -> ClientResult<&Provider> {
        self.provider
            .get_or_try_init(|| async {
                Provider::connect(&self.rpc_url).await.map_err(|e| {
                    ClientError::failure(format!(
                        "Failed to connect to provider at {}: {e}",
                        self.rpc_url
                    ))
                })
            })
            .await
    }
}

impl InjectedWallet for KeystoreWallet {
    type Contract = FuelGameContract;

    fn label(&self) -> &str {
        &self.descriptor.name
    }

    async fn connect(
        &self,
        unlock: Unlock,
        contract_id: ContractId,
    ) -> ClientResult<Connection<FuelGameContract>> {
        let password = match unlock {
            Unlock::Password(password) => password,
            Unlock::Declined => return Err(ClientError::Declined),
        };
        let signer = wallets::unlock_signer(&self.descriptor, &password)?;
        let provider = self.provider().await?.clone();

        let consensus_parameters = provider.consensus_parameters().await?;
        let chain_id = *consensus_parameters.chain_id();
        if let Some(expected) = self.expected_chain_id
            && expected != chain_id
        {
            return Err(ClientError::failure(format!(
                "Wallet is on chain {chain_id}, expected chain {expected}"
            )));
        }
        let max_gas_per_tx = consensus_parameters.tx_params().max_gas_per_tx();
        let safe_script_gas_limit = max_gas_per_tx
            .saturating_sub(1)
            .clamp(1, DEFAULT_SAFE_SCRIPT_GAS_LIMIT);

        let wallet = Wallet::new(signer, provider);
        let account: Address = (*wallet.address()).into();
        info!(
            wallet = %self.descriptor.name,
            account = %account_hex(&account),
            chain_id,
            safe_script_gas_limit,
            "wallet unlocked"
        );
        let contract = FuelGameContract::new(contract_id, wallet, safe_script_gas_limit);
        Ok(Connection { account, contract })
    }

    async fn observe(&self) -> Observation {
        let account_stamp = self.descriptor.stamp();
        let chain_id = match self.provider().await {
            Ok(provider) => match provider.chain_info().await {
                Ok(info) => Some(*info.consensus_parameters.chain_id()),
                Err(err) => {
                    debug!(error = %err, "chain id lookup failed");
                    None
                }
            },
            Err(err) => {
                debug!(error = %err, "provider unavailable for chain id lookup");
                None
            }
        };
        Observation {
            account_stamp,
            chain_id,
        }
    }
}

/// Subscription to wallet account/network changes. Dropping it unsubscribes.
pub struct WalletWatch {
    ticker: Interval,
    detector: ChangeDetector,
}

impl WalletWatch {
    pub fn subscribe(period: Duration) -> Self {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            ticker,
            detector: ChangeDetector::default(),
        }
    }

    pub async fn next_event<W: InjectedWallet>(&mut self, wallet: &W) -> WalletEvent {
        loop {
            self.ticker.tick().await;
            let observed = wallet.observe().await;
            if let Some(event) = self.detector.record(observed) {
                return event;
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct ChangeDetector {
    baseline: Option<Observation>,
}

impl ChangeDetector {
    /// The first observation becomes the baseline. A chain id that could not
    /// be read never counts as a change.
    pub fn record(&mut self, observed: Observation) -> Option<WalletEvent> {
        let Some(baseline) = self.baseline.as_mut() else {
            self.baseline = Some(observed);
            return None;
        };
        if baseline.account_stamp != observed.account_stamp {
            baseline.account_stamp = observed.account_stamp;
            return Some(WalletEvent::AccountsChanged);
        }
        match (baseline.chain_id, observed.chain_id) {
            (Some(before), Some(after)) if before != after => {
                baseline.chain_id = Some(after);
                Some(WalletEvent::ChainChanged)
            }
            (None, Some(after)) => {
                baseline.chain_id = Some(after);
                None
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use crate::{
        contract::Approval,
        game::Move,
    };
    use generated_abi::rps_types::GameRecord;
    use std::{
        fs,
        sync::Mutex,
        time::UNIX_EPOCH,
    };
    use tempdir::TempDir;

    struct NoopContract;

    impl GameContract for NoopContract {
        async fn play(&self, _: Move, _: Approval) -> ClientResult<()> {
            Ok(())
        }

        async fn game_history(&self, _: &Address) -> ClientResult<Vec<GameRecord>> {
            Ok(Vec::new())
        }
    }

    struct ScriptedWallet {
        observations: Mutex<Vec<Observation>>,
    }

    impl InjectedWallet for ScriptedWallet {
        type Contract = NoopContract;

        fn label(&self) -> &str {
            "scripted"
        }

        async fn connect(
            &self,
            _: Unlock,
            _: ContractId,
        ) -> ClientResult<Connection<NoopContract>> {
            Err(ClientError::failure("not used"))
        }

        async fn observe(&self) -> Observation {
            let mut queue = self.observations.lock().unwrap();
            if queue.len() > 1 {
                queue.remove(0)
            } else {
                queue[0]
            }
        }
    }

    fn at(secs: u64) -> Option<SystemTime> {
        Some(UNIX_EPOCH + Duration::from_secs(secs))
    }

    #[test]
    fn record__first_observation_is_baseline() {
        let mut watch = ChangeDetector::default();
        let event = watch.record(Observation {
            account_stamp: at(1),
            chain_id: Some(0),
        });
        assert_eq!(event, None);
    }

    #[test]
    fn record__detects_account_and_chain_changes() {
        // given
        let mut watch = ChangeDetector::default();
        watch.record(Observation {
            account_stamp: at(1),
            chain_id: Some(0),
        });

        // when
        let unchanged = watch.record(Observation {
            account_stamp: at(1),
            chain_id: Some(0),
        });
        let account = watch.record(Observation {
            account_stamp: at(2),
            chain_id: Some(0),
        });
        let chain = watch.record(Observation {
            account_stamp: at(2),
            chain_id: Some(9),
        });
        let removed = watch.record(Observation {
            account_stamp: None,
            chain_id: Some(9),
        });

        // then
        assert_eq!(unchanged, None);
        assert_eq!(account, Some(WalletEvent::AccountsChanged));
        assert_eq!(chain, Some(WalletEvent::ChainChanged));
        assert_eq!(removed, Some(WalletEvent::AccountsChanged));
    }

    #[test]
    fn record__unread_chain_is_not_a_change() {
        // given
        let mut watch = ChangeDetector::default();
        watch.record(Observation {
            account_stamp: at(1),
            chain_id: None,
        });

        // when
        let learned = watch.record(Observation {
            account_stamp: at(1),
            chain_id: Some(3),
        });
        let lost = watch.record(Observation {
            account_stamp: at(1),
            chain_id: None,
        });

        // then
        assert_eq!(learned, None);
        assert_eq!(lost, None);
    }

    #[tokio::test(start_paused = true)]
    async fn next_event__polls_until_the_wallet_changes() {
        // given
        let wallet = ScriptedWallet {
            observations: Mutex::new(vec![
                Observation {
                    account_stamp: at(1),
                    chain_id: Some(0),
                },
                Observation {
                    account_stamp: at(1),
                    chain_id: Some(0),
                },
                Observation {
                    account_stamp: at(1),
                    chain_id: Some(1),
                },
            ]),
        };
        let mut watch = WalletWatch::subscribe(Duration::from_millis(10));

        // when
        let event = watch.next_event(&wallet).await;

        // then
        assert_eq!(event, WalletEvent::ChainChanged);
    }

    #[tokio::test]
    async fn connect__declined_unlock_never_reaches_the_provider() {
        // given
        let tmp = TempDir::new("rps-provider").unwrap();
        let path = tmp.path().join("alice.wallet");
        fs::write(&path, b"{}").unwrap();
        let wallet = KeystoreWallet::new(
            WalletDescriptor::new("alice", path),
            "http://127.0.0.1:1",
            None,
        );

        // when
        let result = wallet
            .connect(Unlock::Declined, ContractId::from([7u8; 32]))
            .await;

        // then
        assert_eq!(result.err(), Some(ClientError::Declined));
        assert!(wallet.provider.get().is_none());
    }

    #[tokio::test]
    async fn connect__missing_keystore_reports_missing_wallet() {
        // given
        let tmp = TempDir::new("rps-provider").unwrap();
        let wallet = KeystoreWallet::new(
            WalletDescriptor::new("ghost", tmp.path().join("ghost.wallet")),
            "http://127.0.0.1:1",
            None,
        );

        // when
        let result = wallet
            .connect(Unlock::Password("pw".to_string()), ContractId::from([7u8; 32]))
            .await;

        // then
        assert_eq!(
            result.err(),
            Some(ClientError::WalletMissing {
                dir: tmp.path().to_path_buf()
            })
        );
        assert!(wallet.provider.get().is_none());
    }

    #[test]
    fn short_account__keeps_prefix_and_suffix() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        bytes[31] = 0xcd;
        let account = Address::from(bytes);

        assert_eq!(short_account(&account), "0xab00...00cd");
        assert_eq!(account_hex(&account).len(), 66);
    }

    #[test]
    fn unlock_debug__never_prints_the_password() {
        let rendered = format!("{:?}", Unlock::Password("hunter2".to_string()));
        assert!(!rendered.contains("hunter2"));
    }
}
