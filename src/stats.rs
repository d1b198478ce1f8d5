use std::fmt;
use std::ops::AddAssign;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stats {
    pub num_relations: usize,
    pub num_skipped_relations: usize,
    pub num_ways: usize,
    pub num_locations: usize,
    pub num_dropped_nodes: usize,
    pub num_missing_locations: usize,
}

impl AddAssign for Stats {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.num_relations += other.num_relations;
        self.num_skipped_relations += other.num_skipped_relations;
        self.num_ways += other.num_ways;
        self.num_locations += other.num_locations;
        self.num_dropped_nodes += other.num_dropped_nodes;
        self.num_missing_locations += other.num_missing_locations;
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(
            f,
            r#"Relations:
  matched:      {}
  skipped:      {}
Ways:           {}
Locations:      {}
  dropped:      {}
  missing:      {}"#,
            self.num_relations,
            self.num_skipped_relations,
            self.num_ways,
            self.num_locations,
            self.num_dropped_nodes,
            self.num_missing_locations
        )
    }
}

#[cfg(test)]
mod test {
    use super::Stats;

    #[test]
    fn test_add_assign() {
        let mut stats = Stats {
            num_relations: 1,
            num_ways: 2,
            ..Default::default()
        };
        stats += Stats {
            num_relations: 1,
            num_dropped_nodes: 3,
            ..Default::default()
        };
        assert_eq!(stats.num_relations, 2);
        assert_eq!(stats.num_ways, 2);
        assert_eq!(stats.num_dropped_nodes, 3);
    }
}
