use log::{debug, error, info, trace, warn};
use rand::seq::SliceRandom;
use rocket_okapi::okapi::schemars;
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::env;
use std::time::Instant;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Default destination the escape search runs toward: a defensible corner
/// pocket on the reference layout.
const ESCAPE_DESTINATION: Coord = Coord { x: 1, y: 2 };

#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone)]
pub struct TeamProfile {
    /// Display name for this team. Example: "Slipstream"
    name: String,
    /// Registered agent filling the team's first slot. Example: "escape"
    first: String,
    /// Registered agent filling the team's second slot. Example: "defense"
    second: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct Info {
    /// Version of the capture agent API implemented by this service. Currently only API version 1 is valid. Example: "1"
    apiversion: String,
    /// Username of the author of this team. If provided, this will be used to verify ownership. Example: "slipstream"
    author: String,
    /// The team composition this service answers /move requests with.
    #[serde(flatten)]
    profile: TeamProfile,
    /// A version number or tag for this team.
    version: String,
}

#[derive(Debug, EnumIter, Serialize, Deserialize, JsonSchema, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
    Stop,
}

impl Direction {
    fn delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::Stop => (0, 0),
        }
    }
    fn reverse(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Stop => Direction::Stop,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Red,
    Blue,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Coord {
    x: i32,
    y: i32,
}

impl Coord {
    fn manhattan_distance(&self, other: &Coord) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct PriorityCoord {
    coord: Coord,
    priority: u32,
}

impl Ord for PriorityCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        other.priority.cmp(&self.priority)
    }
}

impl PartialOrd for PriorityCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, Copy, PartialEq)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Owning cell under the half-step convention: agents mid-transition
    /// report fractional coordinates, and a half step counts as arrived on
    /// the y axis only.
    fn cell(&self) -> Coord {
        Coord {
            x: self.x.floor() as i32,
            y: (self.y + 0.5).floor() as i32,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone)]
pub struct AgentSnapshot {
    /// Index of this agent in the game's fixed turn order. Example: 0
    index: usize,
    /// Which team the agent plays for.
    team: Team,
    /// Current position, or null when the agent is outside sight range.
    position: Option<Position>,
    /// The cell the agent spawned at and respawns to when captured.
    start: Coord,
    /// The direction the agent moved on its previous turn.
    facing: Direction,
    /// True while the agent is raiding the opposing half of the board.
    is_pacman: bool,
    /// Turns remaining in the scared state after the opposition ate a power capsule. Example: 0
    scared_timer: u32,
    /// Pellets eaten and not yet banked at home. Example: 3
    carrying: u32,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone)]
pub struct Game {
    /// A unique identifier for this game. Example: "totally-unique-game-id"
    id: String,
    /// Name of the layout the host loaded. Example: "defaultCapture"
    layout: String,
    /// How much time this service has to respond to /move requests, in milliseconds. Example: 1000
    timeout: u32,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone)]
pub struct Board {
    /// The number of columns in the x-axis of the game board. Example: 32
    width: i32,
    /// The number of rows in the y-axis of the game board. Example: 16
    height: i32,
    /// Cells occupied by walls. Walls never move during a game.
    walls: HashSet<Coord>,
    /// Food on the red half: defended by red, eaten by blue.
    red_food: HashSet<Coord>,
    /// Food on the blue half: defended by blue, eaten by red.
    blue_food: HashSet<Coord>,
    /// Every agent the host reports, in turn order.
    agents: Vec<AgentSnapshot>,
    /// Mapping of agent indexes to their slot in the agents array.
    #[serde(skip)]
    agent_slots: HashMap<usize, usize>,
}

impl Board {
    fn has_wall(&self, coord: &Coord) -> bool {
        self.walls.contains(coord)
    }
    fn agent(&self, index: usize) -> Option<&AgentSnapshot> {
        let slot = self.agent_slots.get(&index)?;
        self.agents.get(*slot)
    }
    fn food_to_eat(&self, team: Team) -> &HashSet<Coord> {
        match team {
            Team::Red => &self.blue_food,
            Team::Blue => &self.red_food,
        }
    }
    fn food_defended(&self, team: Team) -> &HashSet<Coord> {
        match team {
            Team::Red => &self.red_food,
            Team::Blue => &self.blue_food,
        }
    }
    fn home_side(&self, team: Team, cell: &Coord) -> bool {
        match team {
            Team::Red => cell.x < self.width / 2,
            Team::Blue => cell.x >= self.width / 2,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone)]
pub struct GameState {
    /// Game object describing the match being played.
    game: Game,
    /// Turn number of the game being played (0 for new games).
    turn: u32,
    /// Board object: walls, food, and every reported agent.
    board: Board,
    /// Index of the agent being asked to move.
    you: usize,
    /// Current score; positive favors red.
    score: i32,
}

fn in_bounds(coord: &Coord, width: i32, height: i32) -> bool {
    return coord.x >= 0 && coord.y >= 0 && coord.x < width && coord.y < height;
}

impl GameState {
    fn init(&mut self) {
        self.compute_metadata();
    }
    fn compute_metadata(&mut self) {
        let mut agent_slots: HashMap<usize, usize> = HashMap::new();
        for (slot, agent) in self.board.agents.iter().enumerate() {
            agent_slots.insert(agent.index, slot);
        }
        self.board.agent_slots = agent_slots;
    }
    fn you_agent(&self) -> Option<&AgentSnapshot> {
        self.board.agent(self.you)
    }
    fn you_cell(&self) -> Option<Coord> {
        self.you_agent().and_then(|a| a.position).map(|p| p.cell())
    }
    fn relative_score(&self, team: Team) -> i32 {
        match team {
            Team::Red => self.score,
            Team::Blue => -self.score,
        }
    }
    fn adjacent_coord(&self, coord: &Coord, dir: &Direction) -> Coord {
        let (dx, dy) = dir.delta();
        Coord {
            x: coord.x + dx,
            y: coord.y + dy,
        }
    }
    fn adjacent_moves(&self, coord: &Coord) -> Vec<(Coord, Direction)> {
        let mut moves: Vec<(Coord, Direction)> = Vec::new();
        for direction in Direction::iter() {
            if direction == Direction::Stop {
                continue;
            }
            moves.push((self.adjacent_coord(coord, &direction), direction));
        }
        moves
    }
    fn valid_at(&self, coord: &Coord) -> bool {
        in_bounds(coord, self.board.width, self.board.height)
    }
    fn safe_at(&self, coord: &Coord) -> bool {
        !self.board.has_wall(coord)
    }
    fn viable(&self, coord: &Coord) -> bool {
        self.valid_at(coord) && self.safe_at(coord)
    }
    /// The host's action set: every open adjacent cell plus standing still.
    fn legal_actions(&self, from: Coord) -> Vec<Direction> {
        let mut actions: Vec<Direction> = Vec::new();
        for (coord, direction) in self.adjacent_moves(&from) {
            if self.viable(&coord) {
                actions.push(direction);
            }
        }
        actions.push(Direction::Stop);
        actions
    }
    /// One-step lookahead for the asked-about agent. Only the mover changes:
    /// position, facing, raider flag, pellet pickup, and banking carried
    /// pellets on re-entering the home half. Captures and scared ghosts stay
    /// host-side.
    fn successor(&self, action: Direction) -> GameState {
        let mut next = self.clone();
        let Some(slot) = next.board.agent_slots.get(&next.you).copied() else {
            error!("no agent at index {:?}", next.you);
            return next;
        };
        let Some(pos) = next.board.agents[slot].position else {
            return next;
        };
        let team = next.board.agents[slot].team;
        let target = next.adjacent_coord(&pos.cell(), &action);
        let ate = match team {
            Team::Red => next.board.blue_food.remove(&target),
            Team::Blue => next.board.red_food.remove(&target),
        };
        let home = next.board.home_side(team, &target);
        let agent = &mut next.board.agents[slot];
        agent.position = Some(Position {
            x: target.x as f32,
            y: target.y as f32,
        });
        agent.facing = action;
        agent.is_pacman = !home;
        if ate {
            agent.carrying += 1;
        }
        if home && agent.carrying > 0 {
            let banked = agent.carrying as i32;
            agent.carrying = 0;
            next.score += match team {
                Team::Red => banked,
                Team::Blue => -banked,
            };
        }
        next
    }
    // TODO: memoize maze distances within a request; nearest_food alone
    // queries every pellet.
    fn maze_distance(&self, start: &Coord, end: &Coord) -> Option<u32> {
        let mut nodes: BinaryHeap<PriorityCoord> = BinaryHeap::new();
        let mut visited: HashSet<Coord> = HashSet::new();
        let mut distances: HashMap<Coord, u32> = HashMap::new();
        nodes.push(PriorityCoord {
            coord: start.clone(),
            priority: 0,
        });
        visited.insert(start.clone());
        distances.insert(start.clone(), 0);
        while let Some(PriorityCoord { coord, priority: _ }) = nodes.pop() {
            if coord == *end {
                return Some(distances[&coord]);
            }
            for (adj_coord, _) in self.adjacent_moves(&coord) {
                if !self.viable(&adj_coord) {
                    continue;
                }
                if visited.contains(&adj_coord) {
                    continue;
                }
                let new_distance = distances[&coord] + 1;
                let adjacent_distance = distances.get(&adj_coord);
                if adjacent_distance == None || new_distance < *adjacent_distance.unwrap() {
                    distances.insert(adj_coord.clone(), new_distance);
                    visited.insert(adj_coord.clone());
                    let new_priority = distances[&coord] + adj_coord.manhattan_distance(end) as u32;
                    nodes.push(PriorityCoord {
                        coord: adj_coord.clone(),
                        priority: new_priority,
                    })
                }
            }
        }
        None
    }
    /// Nearest pellet this agent can eat, by maze distance. When the board
    /// has none left, falls back to the first pellet the team is defending,
    /// which keeps the caller pointed at something concrete in the endgame.
    fn nearest_food(&self) -> Option<(Coord, u32)> {
        let me = self.you_agent()?;
        let my_cell = me.position?.cell();
        let food = self.board.food_to_eat(me.team);
        let mut nearest: Option<(Coord, u32)> = None;
        for pellet in food {
            let Some(distance) = self.maze_distance(&my_cell, pellet) else {
                continue;
            };
            let better = match nearest {
                None => true,
                Some((best, best_distance)) => {
                    distance < best_distance
                        || (distance == best_distance && (pellet.x, pellet.y) < (best.x, best.y))
                }
            };
            if better {
                nearest = Some((*pellet, distance));
            }
        }
        if nearest.is_none() {
            let defended = self.board.food_defended(me.team);
            let previous = defended.iter().min_by_key(|c| (c.x, c.y))?;
            let distance = self.maze_distance(&my_cell, previous)?;
            return Some((*previous, distance));
        }
        nearest
    }
    /// Nearest visible enemy ghost (an opponent on its own half), by maze
    /// distance. Raiding opponents are someone else's problem.
    fn nearest_enemy(&self) -> Option<(Coord, u32)> {
        let me = self.you_agent()?;
        let my_cell = me.position?.cell();
        let mut nearest: Option<(Coord, u32)> = None;
        for agent in &self.board.agents {
            if agent.team == me.team || agent.is_pacman {
                continue;
            }
            let Some(position) = agent.position else {
                continue;
            };
            let cell = position.cell();
            let Some(distance) = self.maze_distance(&my_cell, &cell) else {
                continue;
            };
            let better = match nearest {
                None => true,
                Some((best, best_distance)) => {
                    distance < best_distance
                        || (distance == best_distance && (cell.x, cell.y) < (best.x, best.y))
                }
            };
            if better {
                nearest = Some((cell, distance));
            }
        }
        nearest
    }
    /// Depth-first flood from the agent's cell toward `destination`,
    /// treating the enemy cell as already visited so the expansion never
    /// enters it. The returned path is the trail of popped cells with stale
    /// tails pruned by Manhattan adjacency whenever the expansion runs into
    /// ground it has already covered.
    ///
    /// Total over its inputs: an unreachable destination yields whatever
    /// partial trail accumulated, never an error. The start cell goes on
    /// the frontier unconditionally, even when it matches the enemy cell;
    /// only neighbor expansion respects the block.
    fn escape_path(
        &self,
        width: i32,
        height: i32,
        enemy: Option<Coord>,
        destination: Coord,
    ) -> Vec<Coord> {
        let Some(me) = self.you_agent() else {
            return Vec::new();
        };
        let Some(pos) = me.position else {
            return Vec::new();
        };
        let mut frontier: Vec<Coord> = Vec::new();
        let mut visited: HashSet<Coord> = HashSet::new();
        if let Some(cell) = enemy {
            visited.insert(cell);
        }
        let mut current = pos.cell();
        frontier.push(current);
        let mut path: Vec<Coord> = Vec::new();

        while !frontier.is_empty() {
            let mut looped = false;

            let west = Coord {
                x: current.x - 1,
                y: current.y,
            };
            if west.x >= 0 && !visited.contains(&west) && !self.board.has_wall(&west) {
                frontier.push(west);
                visited.insert(west);
            }
            looped |= visited.contains(&west);

            let north = Coord {
                x: current.x,
                y: current.y + 1,
            };
            if north.y < height && !visited.contains(&north) && !self.board.has_wall(&north) {
                frontier.push(north);
                visited.insert(north);
            }
            looped |= visited.contains(&north);

            let south = Coord {
                x: current.x,
                y: current.y - 1,
            };
            if south.y >= 0 && !visited.contains(&south) && !self.board.has_wall(&south) {
                frontier.push(south);
                visited.insert(south);
            }
            looped |= visited.contains(&south);

            let east = Coord {
                x: current.x + 1,
                y: current.y,
            };
            if east.x < width && !visited.contains(&east) && !self.board.has_wall(&east) {
                frontier.push(east);
                visited.insert(east);
            }
            looped |= visited.contains(&east);

            // Running into visited ground means the walk crossed back over
            // an explored branch; anything dangling past the current cell
            // is stale.
            if looped {
                prune_tail(&mut path, &current);
            }

            if current == destination {
                trace!("escape path found, {:?} cells", path.len());
                return path;
            }

            let Some(next) = frontier.pop() else {
                break;
            };
            current = next;
            prune_tail(&mut path, &current);
            path.push(current);
        }
        trace!("escape path exhausted, {:?} cells", path.len());
        path
    }
}

/// Drop trailing path entries more than one step from the active cell,
/// stopping at the first adjacent entry.
fn prune_tail(path: &mut Vec<Coord>, current: &Coord) {
    while let Some(tail) = path.last() {
        if tail.manhattan_distance(current) > 1 {
            path.pop();
        } else {
            break;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Features {
    successor_score: f32,
    distance_to_food: f32,
    on_defense: f32,
    num_invaders: f32,
    invader_distance: f32,
    stop: f32,
    reverse: f32,
}

impl Features {
    fn new() -> Self {
        Features::default()
    }
    fn dot(&self, weights: &Weights) -> f32 {
        self.successor_score * weights.successor_score
            + self.distance_to_food * weights.distance_to_food
            + self.on_defense * weights.on_defense
            + self.num_invaders * weights.num_invaders
            + self.invader_distance * weights.invader_distance
            + self.stop * weights.stop
            + self.reverse * weights.reverse
    }
}

#[derive(Debug, Clone, Default)]
pub struct Weights {
    successor_score: f32,
    distance_to_food: f32,
    on_defense: f32,
    num_invaders: f32,
    invader_distance: f32,
    stop: f32,
    reverse: f32,
}

pub trait CaptureAgent {
    fn choose_action(&self, gs: &GameState) -> Direction;
}

/// Score-maximizing action selection shared by the reflex agents: evaluate
/// every legal action's successor, break ties uniformly at random. With two
/// or fewer pellets left to eat, features stop mattering and the agent runs
/// the shortest maze route back to its spawn.
fn reflex_action<F>(gs: &GameState, evaluate: F) -> Direction
where
    F: Fn(&GameState, Direction) -> f32,
{
    let Some(me) = gs.you_agent() else {
        warn!("asked to move unknown agent {:?}", gs.you);
        return Direction::Stop;
    };
    let Some(position) = me.position else {
        warn!("asked to move agent {:?} with no position", gs.you);
        return Direction::Stop;
    };
    let team = me.team;
    let start = me.start;
    let actions = gs.legal_actions(position.cell());

    let food_left = gs.board.food_to_eat(team).len();
    if food_left <= 2 {
        let mut best: Option<(Direction, u32)> = None;
        for action in &actions {
            let successor = gs.successor(*action);
            let Some(next_cell) = successor.you_cell() else {
                continue;
            };
            let Some(distance) = gs.maze_distance(&next_cell, &start) else {
                continue;
            };
            if best.is_none() || distance < best.unwrap().1 {
                best = Some((*action, distance));
            }
        }
        if let Some((action, _)) = best {
            return action;
        }
    }

    let values: Vec<f32> = actions.iter().map(|a| evaluate(gs, *a)).collect();
    debug!("actions {:?} values {:?}", actions, values);
    let max_value = values.iter().cloned().fold(f32::MIN, f32::max);
    let best_actions: Vec<Direction> = actions
        .iter()
        .zip(values.iter())
        .filter(|(_, v)| **v == max_value)
        .map(|(a, _)| *a)
        .collect();
    *best_actions
        .choose(&mut rand::thread_rng())
        .unwrap_or(&Direction::Stop)
}

/// Raider: maximizes pellets eaten, tiebroken by closing on the nearest one.
pub struct OffensiveReflexAgent;

impl OffensiveReflexAgent {
    fn features(&self, gs: &GameState, action: Direction) -> Features {
        let mut features = Features::new();
        let successor = gs.successor(action);
        let Some(me) = successor.you_agent() else {
            return features;
        };
        let food = successor.board.food_to_eat(me.team);
        features.successor_score = -(food.len() as f32);
        if let Some(position) = me.position {
            let my_cell = position.cell();
            let mut min_distance: Option<u32> = None;
            for pellet in food {
                let Some(distance) = successor.maze_distance(&my_cell, pellet) else {
                    continue;
                };
                if min_distance.is_none() || distance < min_distance.unwrap() {
                    min_distance = Some(distance);
                }
            }
            if let Some(distance) = min_distance {
                features.distance_to_food = distance as f32;
            }
        }
        features
    }
    fn weights(&self) -> Weights {
        Weights {
            successor_score: 100.0,
            distance_to_food: -1.0,
            ..Weights::default()
        }
    }
}

impl CaptureAgent for OffensiveReflexAgent {
    fn choose_action(&self, gs: &GameState) -> Direction {
        reflex_action(gs, |gs, action| {
            self.features(gs, action).dot(&self.weights())
        })
    }
}

/// Defender: stays on its own half and hunts visible invaders.
pub struct DefensiveReflexAgent;

impl DefensiveReflexAgent {
    fn features(&self, gs: &GameState, action: Direction) -> Features {
        let mut features = Features::new();
        let successor = gs.successor(action);
        let Some(me) = successor.you_agent() else {
            return features;
        };
        features.on_defense = if me.is_pacman { 0.0 } else { 1.0 };
        let invaders: Vec<Coord> = successor
            .board
            .agents
            .iter()
            .filter(|a| a.team != me.team && a.is_pacman)
            .filter_map(|a| a.position.map(|p| p.cell()))
            .collect();
        features.num_invaders = invaders.len() as f32;
        if let Some(position) = me.position {
            let my_cell = position.cell();
            let mut min_distance: Option<u32> = None;
            for invader in &invaders {
                let Some(distance) = successor.maze_distance(&my_cell, invader) else {
                    continue;
                };
                if min_distance.is_none() || distance < min_distance.unwrap() {
                    min_distance = Some(distance);
                }
            }
            if let Some(distance) = min_distance {
                features.invader_distance = distance as f32;
            }
        }
        if action == Direction::Stop {
            features.stop = 1.0;
        }
        if let Some(current) = gs.you_agent() {
            if action == current.facing.reverse() {
                features.reverse = 1.0;
            }
        }
        features
    }
    fn weights(&self) -> Weights {
        Weights {
            num_invaders: -1000.0,
            on_defense: 100.0,
            invader_distance: -10.0,
            stop: -100.0,
            reverse: -2.0,
            ..Weights::default()
        }
    }
}

impl CaptureAgent for DefensiveReflexAgent {
    fn choose_action(&self, gs: &GameState) -> Direction {
        reflex_action(gs, |gs, action| {
            self.features(gs, action).dot(&self.weights())
        })
    }
}

/// Raider with an exit plan: scores actions by food and score progress, and
/// rewards staying on the escape route whenever a ghost is in sight.
pub struct EscapeAgent {
    destination: Coord,
}

impl EscapeAgent {
    pub fn new() -> Self {
        EscapeAgent {
            destination: ESCAPE_DESTINATION,
        }
    }
    fn evaluate(
        &self,
        gs: &GameState,
        nearest_food: Option<(Coord, u32)>,
        nearest_enemy: Option<(Coord, u32)>,
        escape: &[Coord],
        action: Direction,
    ) -> i32 {
        let mut score = 0;
        let next = gs.successor(action);
        let Some(me) = next.you_agent() else {
            return score;
        };
        let team = me.team;
        let raiding = me.is_pacman;
        let Some(next_cell) = next.you_cell() else {
            return score;
        };

        if next.relative_score(team) > gs.relative_score(team) {
            score += 5;
        }

        if let Some((food, food_distance)) = nearest_food {
            if let Some(distance) = gs.maze_distance(&next_cell, &food) {
                if distance < food_distance {
                    score += 1;
                }
            }
        }

        if let Some((enemy, enemy_distance)) = nearest_enemy {
            if raiding {
                if let Some(distance) = gs.maze_distance(&next_cell, &enemy) {
                    if distance < enemy_distance {
                        score -= 2;
                    }
                }
                // Two legal actions means Stop plus a single way out.
                let next_actions = next.legal_actions(next_cell);
                if next_actions.len() == 2 {
                    score -= 100;
                }
            }
        }

        if escape.contains(&next_cell) {
            score += 20;
        }

        if raiding && action == Direction::Stop {
            score = -10;
        }

        score
    }
}

impl CaptureAgent for EscapeAgent {
    fn choose_action(&self, gs: &GameState) -> Direction {
        let started = Instant::now();
        let Some(position) = gs.you_agent().and_then(|a| a.position) else {
            warn!("asked to move agent {:?} with no position", gs.you);
            return Direction::Stop;
        };
        let nearest_food = gs.nearest_food();
        let nearest_enemy = gs.nearest_enemy();
        let escape = gs.escape_path(
            gs.board.width,
            gs.board.height,
            nearest_enemy.map(|(cell, _)| cell),
            self.destination,
        );
        let actions = gs.legal_actions(position.cell());
        let values: Vec<i32> = actions
            .iter()
            .map(|a| self.evaluate(gs, nearest_food, nearest_enemy, &escape, *a))
            .collect();
        debug!(
            "eval time for agent {:?}: {:?}ms | actions {:?} values {:?}",
            gs.you,
            started.elapsed().as_millis(),
            actions,
            values
        );
        let max_value = *values.iter().max().unwrap_or(&0);
        let best_actions: Vec<Direction> = actions
            .iter()
            .zip(values.iter())
            .filter(|(_, v)| **v == max_value)
            .map(|(a, _)| *a)
            .collect();
        *best_actions
            .choose(&mut rand::thread_rng())
            .unwrap_or(&Direction::Stop)
    }
}

/// Resolve a registered agent name. Names are fixed at compile time; there
/// is deliberately no dynamic dispatch on arbitrary strings.
pub fn agent_by_name(name: &str) -> Option<Box<dyn CaptureAgent>> {
    match name {
        "offense" => Some(Box::new(OffensiveReflexAgent)),
        "defense" => Some(Box::new(DefensiveReflexAgent)),
        "escape" => Some(Box::new(EscapeAgent::new())),
        _ => None,
    }
}

pub fn create_team(
    first: &str,
    second: &str,
) -> Option<(Box<dyn CaptureAgent>, Box<dyn CaptureAgent>)> {
    Some((agent_by_name(first)?, agent_by_name(second)?))
}

fn team_first() -> String {
    env::var("TEAM_FIRST").unwrap_or_else(|_| "escape".to_owned())
}

fn team_second() -> String {
    env::var("TEAM_SECOND").unwrap_or_else(|_| "defense".to_owned())
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MoveResponse {
    /// The chosen action for this turn. Example: "north"
    #[serde(rename = "move")]
    direction: Direction,
    /// An optional message shown by hosts that render banter. Example: "heading home"
    taunt: String,
}

pub fn info() -> Info {
    let profile = TeamProfile {
        name: "Slipstream".to_owned(),
        first: team_first(),
        second: team_second(),
    };

    let result = Info {
        apiversion: "1".to_owned(),
        author: "slipstream".to_owned(),
        profile,
        version: "0.4.0".to_owned(),
    };

    info!("{:?}", result);

    result
}

pub fn make_move(mut gs: GameState) -> MoveResponse {
    info!("########## TURN {:?} | agent {:?} ##########", gs.turn, gs.you);
    gs.init();

    let first = team_first();
    let second = team_second();
    let Some((first_agent, second_agent)) = create_team(&first, &second) else {
        error!("unknown team composition {:?}/{:?}", first, second);
        return MoveResponse {
            direction: Direction::Stop,
            taunt: "misconfigured team".to_owned(),
        };
    };

    let Some(me) = gs.you_agent() else {
        error!("host asked about unknown agent {:?}", gs.you);
        return MoveResponse {
            direction: Direction::Stop,
            taunt: "who?".to_owned(),
        };
    };

    // The lower-indexed agent of a team fills the first slot.
    let team = me.team;
    let slot = gs
        .board
        .agents
        .iter()
        .filter(|a| a.team == team && a.index < gs.you)
        .count();
    let agent: &dyn CaptureAgent = if slot == 0 {
        first_agent.as_ref()
    } else {
        second_agent.as_ref()
    };

    let started = Instant::now();
    let direction = agent.choose_action(&gs);
    let mr = MoveResponse {
        direction,
        taunt: format!(
            "MOVE: {:?} | TIME: {:?}ms",
            direction,
            started.elapsed().as_millis()
        ),
    };

    info!("{:?}", mr);

    mr
}

pub fn start(gs: GameState) {
    info!("START: {:?}", gs);
}

pub fn end(gs: GameState) {
    info!("END: {:?}", gs);
}
