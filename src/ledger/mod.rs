pub mod error;
pub mod history;
pub mod storage;
pub mod types;

pub use error::LedgerError;
pub use history::{
    fee_total, group_by_date, participants, player_totals, results_on, seat_total, PlayerTotal,
};
pub use storage::{get_ledger_path, load_ledger, save_ledger};
pub use types::{GameRecord, Ledger, Player, LEDGER_VERSION};
