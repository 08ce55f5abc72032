//! The two entity collections and every rule that keeps their
//! cross-references symmetric.
//!
//! Nothing here knows about storage, locking or notification; each mutation
//! reports which collections it touched and the store decides what to do.

use std::collections::{HashMap, HashSet};

use crate::model::{
    new_id, push_unique, remove_id, Artwork, ArtworkFilter, ArtworkList, ArtworkPatch,
    CatalogStats, Clock, ListPatch, NewArtwork,
};

/// Which collections a mutation changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Touched {
    pub artworks: bool,
    pub lists: bool,
}

impl Touched {
    pub const NONE: Touched = Touched {
        artworks: false,
        lists: false,
    };
    #[cfg(test)]
    pub const BOTH: Touched = Touched {
        artworks: true,
        lists: true,
    };

    pub fn is_empty(&self) -> bool {
        !self.artworks && !self.lists
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Collections {
    pub artworks: Vec<Artwork>,
    pub lists: Vec<ArtworkList>,
    clock: Clock,
}

impl Collections {
    /// Build from hydrated snapshots, repairing any broken cross-references.
    /// Returns the number of repairs made.
    pub fn from_parts(artworks: Vec<Artwork>, lists: Vec<ArtworkList>) -> (Self, usize) {
        let mut collections = Collections {
            artworks,
            lists,
            clock: Clock::default(),
        };
        for artwork in &collections.artworks {
            collections.clock.observe(artwork.created_at);
            collections.clock.observe(artwork.updated_at);
        }
        for list in &collections.lists {
            collections.clock.observe(list.created_at);
            collections.clock.observe(list.updated_at);
        }
        let repaired = collections.repair_links();
        (collections, repaired)
    }

    fn repair_links(&mut self) -> usize {
        let mut repaired = 0;

        let mut seen = HashSet::new();
        self.artworks.retain(|a| seen.insert(a.id.clone()));
        let mut seen = HashSet::new();
        self.lists.retain(|l| seen.insert(l.id.clone()));

        let artwork_ids: HashSet<String> = self.artworks.iter().map(|a| a.id.clone()).collect();
        let list_ids: HashSet<String> = self.lists.iter().map(|l| l.id.clone()).collect();

        for artwork in &mut self.artworks {
            let before = artwork.list_ids.len();
            let mut seen = HashSet::new();
            artwork
                .list_ids
                .retain(|id| list_ids.contains(id) && seen.insert(id.clone()));
            repaired += before - artwork.list_ids.len();
        }
        for list in &mut self.lists {
            let before = list.artwork_ids.len();
            let mut seen = HashSet::new();
            list.artwork_ids
                .retain(|id| artwork_ids.contains(id) && seen.insert(id.clone()));
            repaired += before - list.artwork_ids.len();
        }

        let list_pos: HashMap<String, usize> = self
            .lists
            .iter()
            .enumerate()
            .map(|(i, l)| (l.id.clone(), i))
            .collect();
        let artwork_pos: HashMap<String, usize> = self
            .artworks
            .iter()
            .enumerate()
            .map(|(i, a)| (a.id.clone(), i))
            .collect();

        let mut missing_in_lists = Vec::new();
        for artwork in &self.artworks {
            for list_id in &artwork.list_ids {
                if let Some(&li) = list_pos.get(list_id) {
                    if !self.lists[li].contains(&artwork.id) {
                        missing_in_lists.push((li, artwork.id.clone()));
                    }
                }
            }
        }
        let mut missing_in_artworks = Vec::new();
        for list in &self.lists {
            for artwork_id in &list.artwork_ids {
                if let Some(&ai) = artwork_pos.get(artwork_id) {
                    if !self.artworks[ai].in_list(&list.id) {
                        missing_in_artworks.push((ai, list.id.clone()));
                    }
                }
            }
        }

        repaired += missing_in_lists.len() + missing_in_artworks.len();
        for (li, artwork_id) in missing_in_lists {
            self.lists[li].artwork_ids.push(artwork_id);
        }
        for (ai, list_id) in missing_in_artworks {
            self.artworks[ai].list_ids.push(list_id);
        }

        repaired
    }

    /// True when every reference has a matching back-reference and no id repeats.
    pub fn links_consistent(&self) -> bool {
        let artworks_ok = self.artworks.iter().all(|a| {
            let unique: HashSet<&String> = a.list_ids.iter().collect();
            unique.len() == a.list_ids.len()
                && a.list_ids
                    .iter()
                    .all(|lid| self.list(lid).map_or(false, |l| l.contains(&a.id)))
        });
        let lists_ok = self.lists.iter().all(|l| {
            let unique: HashSet<&String> = l.artwork_ids.iter().collect();
            unique.len() == l.artwork_ids.len()
                && l.artwork_ids
                    .iter()
                    .all(|aid| self.artwork(aid).map_or(false, |a| a.in_list(&l.id)))
        });
        artworks_ok && lists_ok
    }

    pub fn artwork(&self, id: &str) -> Option<&Artwork> {
        self.artworks.iter().find(|a| a.id == id)
    }

    pub fn list(&self, id: &str) -> Option<&ArtworkList> {
        self.lists.iter().find(|l| l.id == id)
    }

    fn artwork_index(&self, id: &str) -> Option<usize> {
        self.artworks.iter().position(|a| a.id == id)
    }

    fn list_index(&self, id: &str) -> Option<usize> {
        self.lists.iter().position(|l| l.id == id)
    }

    // -- artworks ------------------------------------------------------------

    pub fn add_artwork(&mut self, mut new: NewArtwork) -> (Artwork, Touched) {
        let now = self.clock.tick();
        let requested_lists = std::mem::take(&mut new.list_ids);
        let artwork = new.into_artwork(new_id(), now);
        let artwork_id = artwork.id.clone();
        self.artworks.push(artwork);

        let mut touched = Touched {
            artworks: true,
            lists: false,
        };
        for list_id in &requested_lists {
            touched.lists |= self.link(&artwork_id, list_id).lists;
        }

        let created = self.artworks[self.artworks.len() - 1].clone();
        (created, touched)
    }

    pub fn update_artwork(&mut self, id: &str, patch: ArtworkPatch) -> Touched {
        let Some(index) = self.artwork_index(id) else {
            return Touched::NONE;
        };
        let now = self.clock.tick();
        let artwork = &mut self.artworks[index];
        patch.apply(artwork);
        artwork.updated_at = now;
        Touched {
            artworks: true,
            lists: false,
        }
    }

    pub fn toggle_favorite(&mut self, id: &str) -> Touched {
        let Some(index) = self.artwork_index(id) else {
            return Touched::NONE;
        };
        let now = self.clock.tick();
        let artwork = &mut self.artworks[index];
        artwork.is_favorite = !artwork.is_favorite;
        artwork.updated_at = now;
        Touched {
            artworks: true,
            lists: false,
        }
    }

    pub fn delete_artwork(&mut self, id: &str) -> Touched {
        let Some(index) = self.artwork_index(id) else {
            return Touched::NONE;
        };
        self.artworks.remove(index);

        let now = self.clock.tick();
        let mut lists_touched = false;
        for list in &mut self.lists {
            if remove_id(&mut list.artwork_ids, id) {
                list.updated_at = now;
                lists_touched = true;
            }
        }
        Touched {
            artworks: true,
            lists: lists_touched,
        }
    }

    // -- lists ---------------------------------------------------------------

    pub fn create_list(&mut self, name: String, description: String) -> (ArtworkList, Touched) {
        let now = self.clock.tick();
        let list = ArtworkList::new(new_id(), name, description, now);
        self.lists.push(list.clone());
        (
            list,
            Touched {
                artworks: false,
                lists: true,
            },
        )
    }

    pub fn update_list(&mut self, id: &str, patch: ListPatch) -> Touched {
        let Some(index) = self.list_index(id) else {
            return Touched::NONE;
        };
        let now = self.clock.tick();
        let list = &mut self.lists[index];
        patch.apply(list);
        list.updated_at = now;
        Touched {
            artworks: false,
            lists: true,
        }
    }

    pub fn delete_list(&mut self, id: &str) -> Touched {
        let Some(index) = self.list_index(id) else {
            return Touched::NONE;
        };
        self.lists.remove(index);

        let now = self.clock.tick();
        let mut artworks_touched = false;
        for artwork in &mut self.artworks {
            if remove_id(&mut artwork.list_ids, id) {
                artwork.updated_at = now;
                artworks_touched = true;
            }
        }
        Touched {
            artworks: artworks_touched,
            lists: true,
        }
    }

    // -- membership ----------------------------------------------------------

    /// Link both sides. Requires both entities to exist.
    pub fn link(&mut self, artwork_id: &str, list_id: &str) -> Touched {
        let (Some(ai), Some(li)) = (self.artwork_index(artwork_id), self.list_index(list_id)) else {
            return Touched::NONE;
        };
        let already_linked =
            self.artworks[ai].in_list(list_id) && self.lists[li].contains(artwork_id);
        if already_linked {
            return Touched::NONE;
        }

        let now = self.clock.tick();
        let mut touched = Touched::NONE;
        let artwork = &mut self.artworks[ai];
        if push_unique(&mut artwork.list_ids, list_id) {
            artwork.updated_at = now;
            touched.artworks = true;
        }
        let list = &mut self.lists[li];
        if push_unique(&mut list.artwork_ids, artwork_id) {
            list.updated_at = now;
            touched.lists = true;
        }
        touched
    }

    /// Unlink both sides. Each side is cleaned up if it exists, so a dangling
    /// half-link is also removed.
    pub fn unlink(&mut self, artwork_id: &str, list_id: &str) -> Touched {
        let ai = self
            .artwork_index(artwork_id)
            .filter(|&i| self.artworks[i].in_list(list_id));
        let li = self
            .list_index(list_id)
            .filter(|&i| self.lists[i].contains(artwork_id));
        if ai.is_none() && li.is_none() {
            return Touched::NONE;
        }

        let now = self.clock.tick();
        let mut touched = Touched::NONE;
        if let Some(ai) = ai {
            let artwork = &mut self.artworks[ai];
            remove_id(&mut artwork.list_ids, list_id);
            artwork.updated_at = now;
            touched.artworks = true;
        }
        if let Some(li) = li {
            let list = &mut self.lists[li];
            remove_id(&mut list.artwork_ids, artwork_id);
            list.updated_at = now;
            touched.lists = true;
        }
        touched
    }

    pub fn clear(&mut self) -> Touched {
        let touched = Touched {
            artworks: !self.artworks.is_empty(),
            lists: !self.lists.is_empty(),
        };
        self.artworks.clear();
        self.lists.clear();
        touched
    }

    // -- queries -------------------------------------------------------------

    pub fn filter(&self, filter: &ArtworkFilter, recent_limit: usize) -> Vec<Artwork> {
        match filter {
            ArtworkFilter::All => self.artworks.clone(),
            ArtworkFilter::Favorites => self
                .artworks
                .iter()
                .filter(|a| a.is_favorite)
                .cloned()
                .collect(),
            ArtworkFilter::Recent => {
                let mut recent = self.artworks.clone();
                recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                recent.truncate(recent_limit);
                recent
            }
            ArtworkFilter::List(list_id) => self
                .artworks
                .iter()
                .filter(|a| a.in_list(list_id))
                .cloned()
                .collect(),
        }
    }

    pub fn search(&self, query: &str) -> Vec<Artwork> {
        if query.is_empty() {
            return self.artworks.clone();
        }
        let needle = query.to_lowercase();
        self.artworks
            .iter()
            .filter(|a| a.matches(&needle))
            .cloned()
            .collect()
    }

    /// Members of a list in the list's own order.
    pub fn artworks_in_list(&self, list_id: &str) -> Vec<Artwork> {
        let Some(list) = self.list(list_id) else {
            return Vec::new();
        };
        list.artwork_ids
            .iter()
            .filter_map(|id| self.artwork(id).cloned())
            .collect()
    }

    /// Lists an artwork belongs to, in the order it joined them.
    pub fn lists_for_artwork(&self, artwork_id: &str) -> Vec<ArtworkList> {
        let Some(artwork) = self.artwork(artwork_id) else {
            return Vec::new();
        };
        artwork
            .list_ids
            .iter()
            .filter_map(|id| self.list(id).cloned())
            .collect()
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            artworks: self.artworks.len(),
            lists: self.lists.len(),
            favorites: self.artworks.iter().filter(|a| a.is_favorite).count(),
        }
    }
}
