//! Cluster membership bookkeeping.
//!
//! Cluster ids are dense `0..k`. Removing the last member of a cluster
//! destroys it by swap-remove, relabelling the former last cluster to the
//! freed id within the same call.

use dpmm_common::{Error, Result};

use crate::priors::ConjugatePrior;

const UNASSIGNED: usize = usize::MAX;

/// A live cluster: its members and the prior updated on them.
#[derive(Debug, Clone)]
pub struct Cluster<P> {
    members: Vec<usize>,
    posterior: P,
}

impl<P> Cluster<P> {
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn posterior(&self) -> &P {
        &self.posterior
    }
}

/// What happened to a point's cluster when it was taken out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Shrunk,
    Destroyed,
}

#[derive(Debug, Clone)]
pub(crate) struct Partition<P> {
    clusters: Vec<Cluster<P>>,
    assignments: Vec<usize>,
}

impl<P: ConjugatePrior> Partition<P> {
    /// Build from explicit groups of indices. Every index in `0..n` must
    /// appear in exactly one non-empty group.
    pub fn from_groups(
        groups: Vec<Vec<usize>>,
        n: usize,
        prior: &P,
        data: &[P::Obs],
    ) -> Result<Self> {
        let mut assignments = vec![UNASSIGNED; n];
        let mut clusters = Vec::with_capacity(groups.len());
        for members in groups.into_iter().filter(|g| !g.is_empty()) {
            let id = clusters.len();
            for &i in &members {
                match assignments.get_mut(i) {
                    Some(slot) if *slot == UNASSIGNED => *slot = id,
                    _ => {
                        return Err(Error::Config(format!(
                            "index {} is out of range or assigned twice",
                            i
                        )))
                    }
                }
            }
            let posterior = prior.posterior(&member_data(&members, data))?;
            clusters.push(Cluster { members, posterior });
        }
        if let Some(i) = assignments.iter().position(|&c| c == UNASSIGNED) {
            return Err(Error::Config(format!("index {} has no cluster", i)));
        }
        Ok(Self {
            clusters,
            assignments,
        })
    }

    pub fn clusters(&self) -> &[Cluster<P>] {
        &self.clusters
    }

    pub fn n_clusters(&self) -> usize {
        self.clusters.len()
    }

    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    /// Take point `i` out of its cluster and refresh or destroy that cluster.
    /// On error the partition is unchanged.
    pub fn remove(&mut self, i: usize, prior: &P, data: &[P::Obs]) -> Result<Removal> {
        let c = match self.assignments.get(i) {
            Some(&c) if c != UNASSIGNED => c,
            _ => return Err(Error::Config(format!("index {} is not assigned", i))),
        };
        let remaining: Vec<usize> = self.clusters[c]
            .members
            .iter()
            .copied()
            .filter(|&m| m != i)
            .collect();

        if remaining.is_empty() {
            self.assignments[i] = UNASSIGNED;
            self.clusters.swap_remove(c);
            // The former last cluster now lives at `c`.
            if let Some(moved) = self.clusters.get(c) {
                for &m in &moved.members {
                    self.assignments[m] = c;
                }
            }
            return Ok(Removal::Destroyed);
        }

        let posterior = prior.posterior(&member_data(&remaining, data))?;
        self.assignments[i] = UNASSIGNED;
        self.clusters[c] = Cluster {
            members: remaining,
            posterior,
        };
        Ok(Removal::Shrunk)
    }

    /// Put point `i` into cluster `target`, or a new cluster when `target`
    /// equals the current cluster count. Returns the cluster id. On error
    /// the partition is unchanged.
    pub fn insert(&mut self, i: usize, target: usize, prior: &P, data: &[P::Obs]) -> Result<usize> {
        if target == self.clusters.len() {
            let posterior = prior.posterior(std::slice::from_ref(&data[i]))?;
            self.clusters.push(Cluster {
                members: vec![i],
                posterior,
            });
        } else {
            let cluster = self
                .clusters
                .get_mut(target)
                .ok_or_else(|| Error::Config(format!("cluster {} does not exist", target)))?;
            let mut members = cluster.members.clone();
            members.push(i);
            cluster.posterior = prior.posterior(&member_data(&members, data))?;
            cluster.members = members;
        }
        self.assignments[i] = target;
        Ok(target)
    }

    /// Seat the unassigned point `i` in a cluster of its own. Never fails:
    /// if the singleton posterior cannot be formed the cluster keeps the
    /// bare prior and the error is handed back for the caller to report.
    pub fn seat_alone(&mut self, i: usize, prior: &P, data: &[P::Obs]) -> Option<Error> {
        let (posterior, err) = match prior.posterior(std::slice::from_ref(&data[i])) {
            Ok(post) => (post, None),
            Err(e) => (prior.clone(), Some(e)),
        };
        self.assignments[i] = self.clusters.len();
        self.clusters.push(Cluster {
            members: vec![i],
            posterior,
        });
        err
    }
}

/// Clone the observations at `members`.
pub(crate) fn member_data<O: Clone>(members: &[usize], data: &[O]) -> Vec<O> {
    members.iter().map(|&m| data[m].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::priors::GaussianKnownVariance;

    fn setup() -> (GaussianKnownVariance, Vec<f64>) {
        (
            GaussianKnownVariance::new(0.0, 1.0, 0.1).unwrap(),
            vec![0.0, 0.1, 5.0, 5.1, 9.0],
        )
    }

    fn check_invariants<P: ConjugatePrior>(p: &Partition<P>, n: usize) {
        let total: usize = p.clusters().iter().map(|c| c.size()).sum();
        assert_eq!(total, n);
        for (id, c) in p.clusters().iter().enumerate() {
            assert!(c.size() > 0);
            for &m in c.members() {
                assert_eq!(p.assignments()[m], id);
            }
        }
    }

    #[test]
    fn from_groups_rejects_gaps_and_duplicates() {
        let (prior, data) = setup();
        assert!(Partition::from_groups(vec![vec![0, 1], vec![1, 2, 3, 4]], 5, &prior, &data).is_err());
        assert!(Partition::from_groups(vec![vec![0, 1, 2]], 5, &prior, &data).is_err());
        let p = Partition::from_groups(vec![vec![0, 1], vec![], vec![2, 3, 4]], 5, &prior, &data).unwrap();
        assert_eq!(p.n_clusters(), 2);
        check_invariants(&p, 5);
    }

    #[test]
    fn destroying_a_cluster_relabels_the_last() {
        let (prior, data) = setup();
        let mut p =
            Partition::from_groups(vec![vec![0], vec![1, 2], vec![3, 4]], 5, &prior, &data).unwrap();
        assert_eq!(p.remove(0, &prior, &data).unwrap(), Removal::Destroyed);
        assert_eq!(p.n_clusters(), 2);
        // Former cluster 2 ({3, 4}) moved to id 0.
        assert_eq!(p.assignments()[3], 0);
        assert_eq!(p.assignments()[4], 0);
        p.insert(0, 2, &prior, &data).unwrap();
        check_invariants(&p, 5);
    }

    #[test]
    fn posterior_tracks_membership() {
        let (prior, data) = setup();
        let mut p = Partition::from_groups(vec![vec![0, 1, 2], vec![3, 4]], 5, &prior, &data).unwrap();
        assert_eq!(p.remove(2, &prior, &data).unwrap(), Removal::Shrunk);
        let expected = prior.posterior(&[0.0, 0.1]).unwrap();
        assert_eq!(p.clusters()[0].posterior(), &expected);

        p.insert(2, 1, &prior, &data).unwrap();
        let mut members = p.clusters()[1].members().to_vec();
        members.sort_unstable();
        assert_eq!(members, vec![2, 3, 4]);
        check_invariants(&p, 5);
    }

    /// Scores like a known-variance Gaussian but refuses to update on any
    /// set containing a value above `limit`.
    #[derive(Debug, Clone, PartialEq)]
    struct Picky {
        inner: GaussianKnownVariance,
        limit: f64,
    }

    impl ConjugatePrior for Picky {
        type Param = f64;
        type Obs = f64;

        fn family(&self) -> &'static str {
            "picky"
        }
        fn obs_dim(&self) -> usize {
            1
        }
        fn check_observation(&self, x: &f64) -> Result<()> {
            self.inner.check_observation(x)
        }
        fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Result<f64> {
            self.inner.sample(rng)
        }
        fn ln_density(&self, theta: &f64) -> Result<f64> {
            self.inner.ln_density(theta)
        }
        fn ln_likelihood_of_one(&self, theta: &f64, x: &f64) -> Result<f64> {
            self.inner.ln_likelihood_of_one(theta, x)
        }
        fn posterior(&self, data: &[f64]) -> Result<Self> {
            if data.iter().any(|&x| x > self.limit) {
                return Err(Error::Numerical(format!("update above {}", self.limit)));
            }
            Ok(Self {
                inner: self.inner.posterior(data)?,
                limit: self.limit,
            })
        }
        fn ln_predictive(&self, x: &f64) -> Result<f64> {
            self.inner.ln_predictive(x)
        }
        fn ln_evidence(&self, data: &[f64]) -> Result<f64> {
            self.inner.ln_evidence(data)
        }
    }

    #[test]
    fn failed_updates_leave_the_partition_untouched() {
        let (inner, _) = setup();
        let loose = Picky { inner, limit: f64::INFINITY };
        let data = vec![0.0, 0.1, 5.0, 5.1, 9.0];
        let mut p = Partition::from_groups(vec![vec![0, 1, 4], vec![2, 3]], 5, &loose, &data).unwrap();
        let before = (p.assignments().to_vec(), p.clusters()[0].posterior().clone());

        // Any remaining set containing 9.0 now fails to update.
        let strict = Picky { limit: 6.0, ..loose.clone() };
        assert!(p.remove(0, &strict, &data).is_err());
        assert_eq!(p.assignments(), &before.0[..]);
        assert_eq!(p.clusters()[0].posterior(), &before.1);
        assert_eq!(p.clusters()[0].size(), 3);

        p.remove(2, &strict, &data).unwrap();
        assert!(p.insert(2, 0, &strict, &data).is_err());
        assert_eq!(p.assignments()[2], UNASSIGNED);
        assert_eq!(p.clusters()[0].size(), 3);

        p.insert(2, 1, &strict, &data).unwrap();
        check_invariants(&p, 5);
    }

    #[test]
    fn seat_alone_always_assigns() {
        let (inner, _) = setup();
        let loose = Picky { inner, limit: f64::INFINITY };
        let strict = Picky { limit: 6.0, ..loose.clone() };
        let data = vec![0.0, 9.0];
        let mut p = Partition::from_groups(vec![vec![0], vec![1]], 2, &loose, &data).unwrap();
        assert_eq!(p.remove(1, &loose, &data).unwrap(), Removal::Destroyed);

        // The singleton update fails, but the point is still seated.
        assert!(p.seat_alone(1, &strict, &data).is_some());
        assert_eq!(p.assignments(), &[0, 1]);
        assert_eq!(p.clusters()[1].posterior(), &strict);
        check_invariants(&p, 2);

        p.remove(0, &loose, &data).unwrap();
        assert!(p.seat_alone(0, &strict, &data).is_none());
        check_invariants(&p, 2);
    }

    #[test]
    fn insert_rejects_unknown_cluster() {
        let (prior, data) = setup();
        let mut p = Partition::from_groups(vec![vec![0, 1, 2, 3, 4]], 5, &prior, &data).unwrap();
        p.remove(4, &prior, &data).unwrap();
        assert!(p.insert(4, 7, &prior, &data).is_err());
    }
}
