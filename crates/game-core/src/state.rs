use std::collections::{BTreeMap, BTreeSet, VecDeque};

use contracts::{BehaviorProfile, EliminationReason, PlayerStatus, Role};

/// How many recent action ids a player remembers for anti-repetition.
pub const HISTORY_WINDOW: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub department: String,
    pub influence: f64,
    pub behavior: BehaviorProfile,
    pub role: Role,
    pub status: PlayerStatus,
    pub elimination_reason: Option<EliminationReason>,
    pub is_human: bool,
}

impl Player {
    pub fn is_alive(&self) -> bool {
        self.status == PlayerStatus::Alive
    }

    pub fn is_traitor(&self) -> bool {
        self.role == Role::Traitor
    }
}

/// The single mutable state of one game, owned by the round controller.
///
/// Players keep roster order; every iteration that feeds the RNG walks them
/// in that order.
#[derive(Debug, Clone)]
pub struct GameState {
    round: u32,
    seed: u32,
    human_id: String,
    players: Vec<Player>,
    alive_ids: BTreeSet<String>,
    eliminated_ids: Vec<String>,
    suspicion: BTreeMap<String, f64>,
    used_action_ids: BTreeSet<String>,
    action_history: BTreeMap<String, VecDeque<String>>,
    traitor_ids: BTreeSet<String>,
}

impl GameState {
    pub(crate) fn new(seed: u32, human_id: String, players: Vec<Player>) -> Self {
        let alive_ids = players
            .iter()
            .filter(|player| player.is_alive())
            .map(|player| player.id.clone())
            .collect();
        let traitor_ids = players
            .iter()
            .filter(|player| player.is_traitor())
            .map(|player| player.id.clone())
            .collect();
        let suspicion = players
            .iter()
            .map(|player| (player.id.clone(), 0.0))
            .collect();
        let action_history = players
            .iter()
            .map(|player| (player.id.clone(), VecDeque::with_capacity(HISTORY_WINDOW)))
            .collect();
        Self {
            round: 1,
            seed,
            human_id,
            players,
            alive_ids,
            eliminated_ids: Vec::new(),
            suspicion,
            used_action_ids: BTreeSet::new(),
            action_history,
            traitor_ids,
        }
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn human_id(&self) -> &str {
        &self.human_id
    }

    pub fn human(&self) -> Option<&Player> {
        self.player(&self.human_id)
    }

    pub fn human_alive(&self) -> bool {
        self.alive_ids.contains(&self.human_id)
    }

    /// Roster order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    pub fn name_of<'a>(&'a self, id: &'a str) -> &'a str {
        self.player(id).map(|player| player.name.as_str()).unwrap_or(id)
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|player| player.is_alive())
    }

    /// Alive bots in roster order.
    pub fn alive_bots(&self) -> impl Iterator<Item = &Player> {
        self.alive_players().filter(|player| !player.is_human)
    }

    pub fn alive_count(&self) -> usize {
        self.alive_ids.len()
    }

    pub fn is_alive(&self, id: &str) -> bool {
        self.alive_ids.contains(id)
    }

    pub fn eliminated_ids(&self) -> &[String] {
        &self.eliminated_ids
    }

    pub fn is_traitor(&self, id: &str) -> bool {
        self.traitor_ids.contains(id)
    }

    pub fn traitor_ids(&self) -> &BTreeSet<String> {
        &self.traitor_ids
    }

    /// Traitor ids in roster order.
    pub fn traitor_ids_in_roster_order(&self) -> Vec<String> {
        self.players
            .iter()
            .filter(|player| player.is_traitor())
            .map(|player| player.id.clone())
            .collect()
    }

    pub fn alive_traitor_count(&self) -> usize {
        self.alive_ids
            .iter()
            .filter(|id| self.traitor_ids.contains(*id))
            .count()
    }

    pub fn suspicion_of(&self, id: &str) -> f64 {
        self.suspicion.get(id).copied().unwrap_or(0.0)
    }

    pub fn suspicion(&self) -> &BTreeMap<String, f64> {
        &self.suspicion
    }

    pub fn is_action_used(&self, action_id: &str) -> bool {
        self.used_action_ids.contains(action_id)
    }

    pub fn used_action_ids(&self) -> &BTreeSet<String> {
        &self.used_action_ids
    }

    /// Most recent last; never longer than [`HISTORY_WINDOW`].
    pub fn recent_actions(&self, player_id: &str) -> Option<&VecDeque<String>> {
        self.action_history.get(player_id)
    }

    pub(crate) fn advance_round(&mut self) {
        self.round = self.round.saturating_add(1);
    }

    pub(crate) fn clear_used_actions(&mut self) {
        self.used_action_ids.clear();
    }

    /// Marks an action as taken. The stub never enters the used set but does
    /// enter history, so a player stuck on it does not crowd out real picks.
    pub(crate) fn record_action(&mut self, player_id: &str, action_id: &str, is_stub: bool) {
        if !is_stub {
            self.used_action_ids.insert(action_id.to_string());
        }
        let history = self.action_history.entry(player_id.to_string()).or_default();
        history.push_back(action_id.to_string());
        while history.len() > HISTORY_WINDOW {
            history.pop_front();
        }
    }

    pub(crate) fn suspicion_values_mut(&mut self) -> impl Iterator<Item = &mut f64> {
        self.suspicion.values_mut()
    }

    pub(crate) fn suspicion_entry(&mut self, id: &str) -> &mut f64 {
        self.suspicion.entry(id.to_string()).or_insert(0.0)
    }

    /// Returns false when the id was not alive; nothing changes then.
    pub(crate) fn mark_eliminated(&mut self, id: &str, reason: EliminationReason) -> bool {
        if !self.alive_ids.remove(id) {
            return false;
        }
        self.eliminated_ids.push(id.to_string());
        if let Some(player) = self.players.iter_mut().find(|player| player.id == id) {
            player.status = PlayerStatus::Eliminated;
            player.elimination_reason = Some(reason);
        }
        true
    }

    /// Structural invariants; returns the first violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        let roster = self
            .players
            .iter()
            .map(|player| player.id.as_str())
            .collect::<BTreeSet<_>>();
        if roster.len() != self.players.len() {
            return Err("duplicate player id in roster".to_string());
        }
        let eliminated = self
            .eliminated_ids
            .iter()
            .map(String::as_str)
            .collect::<BTreeSet<_>>();
        if eliminated.len() != self.eliminated_ids.len() {
            return Err("player eliminated twice".to_string());
        }
        if self
            .alive_ids
            .iter()
            .any(|id| eliminated.contains(id.as_str()))
        {
            return Err("player both alive and eliminated".to_string());
        }
        let union = self
            .alive_ids
            .iter()
            .map(String::as_str)
            .chain(eliminated.iter().copied())
            .collect::<BTreeSet<_>>();
        if union != roster {
            return Err("alive and eliminated ids do not cover the roster".to_string());
        }
        if self.traitor_ids.contains(&self.human_id) {
            return Err("human assigned the traitor role".to_string());
        }
        if !self
            .traitor_ids
            .iter()
            .all(|id| roster.contains(id.as_str()))
        {
            return Err("traitor outside the roster".to_string());
        }
        if let Some((id, value)) = self
            .suspicion
            .iter()
            .find(|(_, value)| !(**value >= 0.0))
        {
            return Err(format!("suspicion for {id} is {value}"));
        }
        if let Some((id, _)) = self
            .action_history
            .iter()
            .find(|(_, history)| history.len() > HISTORY_WINDOW)
        {
            return Err(format!("action history for {id} exceeds the window"));
        }
        Ok(())
    }
}
