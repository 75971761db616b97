use crate::{
    errors::{
        ClientError,
        ClientResult,
    },
    game::Move,
};
use fuels::{
    accounts::wallet::Wallet,
    prelude::{
        Execution,
        TxPolicies,
    },
    types::{
        Address,
        ContractId,
        Identity,
    },
};
use generated_abi::rps_types::{
    GameRecord,
    RpsGame,
};
use tracing::info;

/// The user's answer to the wallet's signing prompt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Approval {
    Granted,
    Declined,
}

impl Approval {
    pub fn ensure_granted(self) -> ClientResult<()> {
        match self {
            Approval::Granted => Ok(()),
            Approval::Declined => Err(ClientError::Declined),
        }
    }
}

/// The two entry points of the game contract.
pub trait GameContract {
    /// Sends `play` with the move's selector and resolves once the
    /// transaction is committed.
    fn play(
        &self,
        player_move: Move,
        approval: Approval,
    ) -> impl Future<Output = ClientResult<()>>;

    /// Read-only; records come back oldest first.
    fn game_history(
        &self,
        player: &Address,
    ) -> impl Future<Output = ClientResult<Vec<GameRecord>>>;
}

pub struct FuelGameContract {
    instance: RpsGame<Wallet>,
    safe_script_gas_limit: u64,
}

impl FuelGameContract {
    pub fn new(id: ContractId, wallet: Wallet, safe_script_gas_limit: u64) -> Self {
        Self {
            instance: generated_abi::game_instance(id, wallet),
            safe_script_gas_limit,
        }
    }

    fn script_policies(&self) -> TxPolicies {
        TxPolicies::default().with_script_gas_limit(self.safe_script_gas_limit)
    }
}

impl GameContract for FuelGameContract {
    async fn play(&self, player_move: Move, approval: Approval) -> ClientResult<()> {
        approval.ensure_granted()?;
        let selector = player_move.selector();
        info!(selector, "submitting play");
        self.instance
            .methods()
            .play(selector)
            .with_tx_policies(self.script_policies())
            .call()
            .await?;
        info!(selector, "play committed");
        Ok(())
    }

    async fn game_history(&self, player: &Address) -> ClientResult<Vec<GameRecord>> {
        let records = self
            .instance
            .methods()
            .get_game_history(Identity::Address(*player))
            .with_tx_policies(self.script_policies())
            .simulate(Execution::state_read_only())
            .await?
            .value;
        Ok(records)
    }
}
