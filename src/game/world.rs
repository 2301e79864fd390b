//! # World Module
//!
//! One dungeon floor: rooms, tunnels, the walkable grid, the visibility
//! and exploration masks, and the entities placed on it.

use crate::game::{Entity, EntityId, Position};
use crate::generation::{Room, Tunnel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a tile is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Wall,
    Floor,
}

impl TileKind {
    /// Whether actors can stand on this tile.
    pub fn is_walkable(self) -> bool {
        self == TileKind::Floor
    }

    /// Whether this tile blocks line of sight.
    pub fn is_opaque(self) -> bool {
        self == TileKind::Wall
    }
}

/// A single grid cell plus its visibility state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    /// In the player's current field of view
    pub visible: bool,
    /// Seen at least once; never cleared
    pub explored: bool,
}

impl Tile {
    /// A solid wall tile.
    pub fn wall() -> Self {
        Self {
            kind: TileKind::Wall,
            visible: false,
            explored: false,
        }
    }

    /// A walkable floor tile.
    pub fn floor() -> Self {
        Self {
            kind: TileKind::Floor,
            visible: false,
            explored: false,
        }
    }

    /// Marks the tile visible, which also marks it explored. Exploration
    /// is monotonic: clearing visibility leaves `explored` set.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if visible {
            self.explored = true;
        }
    }
}

/// One dungeon level: uniquely-named rooms, the tunnels connecting them,
/// the rasterized tile grid, and the non-player entities on it.
///
/// The floor owns its rooms, tunnels, and entities. The player is owned
/// by [`GameState`](crate::GameState); its lifetime spans floors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub name: String,
    pub width: u32,
    pub height: u32,
    rooms: HashMap<String, Room>,
    tunnels: Vec<Tunnel>,
    /// Row-major tile grid, `tiles[y][x]`
    pub tiles: Vec<Vec<Tile>>,
    /// Where the player enters this floor
    pub player_spawn: Position,
    /// Position of the stairs leading down, once placed
    pub stairs_down: Option<Position>,
    entities: Vec<Entity>,
}

impl Floor {
    /// Creates a floor of solid wall.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            rooms: HashMap::new(),
            tunnels: Vec::new(),
            tiles: vec![vec![Tile::wall(); width as usize]; height as usize],
            player_spawn: Position::origin(),
            stairs_down: None,
            entities: Vec::new(),
        }
    }

    /// Whether a position lies on the grid.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    /// The tile at a position, if in bounds.
    pub fn tile(&self, pos: Position) -> Option<&Tile> {
        if self.in_bounds(pos) {
            Some(&self.tiles[pos.y as usize][pos.x as usize])
        } else {
            None
        }
    }

    /// Mutable access to the tile at a position.
    pub fn tile_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        if self.in_bounds(pos) {
            Some(&mut self.tiles[pos.y as usize][pos.x as usize])
        } else {
            None
        }
    }

    /// Whether actors can stand at the position.
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.tile(pos).is_some_and(|tile| tile.kind.is_walkable())
    }

    /// Whether the position blocks line of sight. Out-of-bounds counts as
    /// opaque.
    pub fn is_opaque(&self, pos: Position) -> bool {
        self.tile(pos).map_or(true, |tile| tile.kind.is_opaque())
    }

    /// Adds a room under its unique name.
    pub fn add_room(&mut self, room: Room) {
        self.rooms.insert(room.name.clone(), room);
    }

    /// Adds a tunnel. Tunnel order is creation order.
    pub fn add_tunnel(&mut self, tunnel: Tunnel) {
        self.tunnels.push(tunnel);
    }

    /// The rooms on this floor, keyed by name.
    pub fn rooms(&self) -> &HashMap<String, Room> {
        &self.rooms
    }

    /// A room by name.
    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.get(name)
    }

    /// The tunnels on this floor, in creation order.
    pub fn tunnels(&self) -> &[Tunnel] {
        &self.tunnels
    }

    /// Rebuilds the walkable grid from scratch: every room interior and
    /// every tunnel segment becomes floor, everything else wall.
    pub fn rebuild_grid(&mut self) {
        for row in &mut self.tiles {
            for tile in row.iter_mut() {
                tile.kind = TileKind::Wall;
            }
        }
        let carve: Vec<Position> = self
            .rooms
            .values()
            .flat_map(|room| room.floor_positions())
            .chain(self.tunnels.iter().flat_map(|tunnel| tunnel.segments()))
            .collect();
        for pos in carve {
            if let Some(tile) = self.tile_mut(pos) {
                tile.kind = TileKind::Floor;
            }
        }
    }

    /// Clears the visible mask while leaving exploration intact.
    pub fn clear_visible(&mut self) {
        for row in &mut self.tiles {
            for tile in row.iter_mut() {
                tile.visible = false;
            }
        }
    }

    /// Places an entity on the floor.
    pub fn add_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// The non-player entities on this floor.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Mutable access to the entity list.
    pub fn entities_mut(&mut self) -> &mut Vec<Entity> {
        &mut self.entities
    }

    /// An entity by id.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    /// Removes and returns an entity by id.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.entities.iter().position(|entity| entity.id == id)?;
        Some(self.entities.remove(index))
    }

    /// Entities standing at the given position.
    pub fn entities_at(&self, pos: Position) -> impl Iterator<Item = &Entity> {
        self.entities
            .iter()
            .filter(move |entity| entity.position == pos)
    }

    /// A living enemy at the position, if any.
    pub fn enemy_at(&self, pos: Position) -> Option<&Entity> {
        self.entities_at(pos)
            .find(|entity| entity.flags.enemy && entity.is_alive())
    }

    /// A collectable item at the position, if any.
    pub fn item_at(&self, pos: Position) -> Option<&Entity> {
        self.entities_at(pos).find(|entity| entity.flags.collectable)
    }

    /// Ids of living enemies adjacent (including diagonals) to a position.
    pub fn enemies_adjacent_to(&self, pos: Position) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|entity| {
                entity.flags.enemy && entity.is_alive() && entity.position.is_adjacent(pos)
            })
            .map(|entity| entity.id)
            .collect()
    }

    /// Drops dead entities from the floor, returning how many were
    /// removed.
    pub fn sweep_dead(&mut self) -> usize {
        let before = self.entities.len();
        self.entities
            .retain(|entity| entity.lifecycle != crate::game::Lifecycle::Dead);
        before - self.entities.len()
    }

    /// Count of explored tiles, for progress reporting.
    pub fn explored_count(&self) -> usize {
        self.tiles
            .iter()
            .flat_map(|row| row.iter())
            .filter(|tile| tile.explored)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{Room, RouteMode, Tunnel};

    fn floor_with_room() -> Floor {
        let mut floor = Floor::new("test floor", 20, 20);
        floor.add_room(Room::new("room 0", Position::new(2, 2), 6, 6));
        floor.rebuild_grid();
        floor
    }

    #[test]
    fn test_new_floor_is_solid_wall() {
        let floor = Floor::new("sealed", 10, 8);
        assert_eq!(floor.tiles.len(), 8);
        assert_eq!(floor.tiles[0].len(), 10);
        for y in 0..8 {
            for x in 0..10 {
                assert!(!floor.is_walkable(Position::new(x, y)));
            }
        }
    }

    #[test]
    fn test_rebuild_carves_room_interiors() {
        let floor = floor_with_room();
        // Interior is walkable, border ring is wall.
        assert!(floor.is_walkable(Position::new(3, 3)));
        assert!(floor.is_walkable(Position::new(6, 6)));
        assert!(!floor.is_walkable(Position::new(2, 2)));
        assert!(!floor.is_walkable(Position::new(7, 3)));
    }

    #[test]
    fn test_rebuild_carves_tunnel_segments() {
        let mut floor = Floor::new("tunnelled", 20, 20);
        floor.add_room(Room::new("a", Position::new(1, 1), 5, 5));
        floor.add_room(Room::new("b", Position::new(12, 12), 5, 5));
        floor.add_tunnel(Tunnel::new(
            Position::new(3, 3),
            Position::new(14, 14),
            RouteMode::HorizontalFirst,
        ));
        floor.rebuild_grid();

        // Corner of the L-path.
        assert!(floor.is_walkable(Position::new(14, 3)));
        assert!(floor.is_walkable(Position::new(8, 3)));
        assert!(floor.is_walkable(Position::new(14, 8)));
    }

    #[test]
    fn test_out_of_bounds_is_opaque_not_walkable() {
        let floor = floor_with_room();
        let outside = Position::new(-1, 5);
        assert!(!floor.in_bounds(outside));
        assert!(!floor.is_walkable(outside));
        assert!(floor.is_opaque(outside));
        assert!(floor.tile(outside).is_none());
    }

    #[test]
    fn test_visible_marks_explored_monotonically() {
        let mut floor = floor_with_room();
        let pos = Position::new(3, 3);
        floor.tile_mut(pos).unwrap().set_visible(true);
        assert!(floor.tile(pos).unwrap().visible);
        assert!(floor.tile(pos).unwrap().explored);

        floor.clear_visible();
        assert!(!floor.tile(pos).unwrap().visible);
        assert!(floor.tile(pos).unwrap().explored);
    }

    #[test]
    fn test_entity_queries() {
        let mut floor = floor_with_room();
        let mut rat = Entity::new("rat", 'r');
        rat.flags.enemy = true;
        rat.lifecycle = crate::game::Lifecycle::Alive;
        rat.position = Position::new(4, 4);
        let rat_id = rat.id;
        floor.add_entity(rat);

        let mut loot = Entity::new("coin", '$');
        loot.flags.collectable = true;
        loot.position = Position::new(4, 4);
        floor.add_entity(loot);

        assert!(floor.enemy_at(Position::new(4, 4)).is_some());
        assert!(floor.item_at(Position::new(4, 4)).is_some());
        assert!(floor.enemy_at(Position::new(5, 5)).is_none());
        assert_eq!(floor.enemies_adjacent_to(Position::new(3, 3)), vec![rat_id]);
        assert!(floor.enemies_adjacent_to(Position::new(10, 10)).is_empty());
    }

    #[test]
    fn test_sweep_dead() {
        let mut floor = floor_with_room();
        let mut rat = Entity::new("rat", 'r');
        rat.lifecycle = crate::game::Lifecycle::Dead;
        floor.add_entity(rat);
        let mut bat = Entity::new("bat", 'b');
        bat.lifecycle = crate::game::Lifecycle::Alive;
        floor.add_entity(bat);

        assert_eq!(floor.sweep_dead(), 1);
        assert_eq!(floor.entities().len(), 1);
        assert_eq!(floor.entities()[0].name, "bat");
    }
}
