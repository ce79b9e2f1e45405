//! Runs one end-to-end MIACL session with small, fixed parameters and
//! writes `input.json` for downstream verifier implementations.

use rand::rngs::OsRng;

use miacl::fixture::Fixture;
use miacl::group;
use miacl::keygen::{self, split};
use miacl::params::Params;
use miacl::registration::{self, RegistrationStore};
use miacl::sign::{self, Signer};

fn main() {
    tracing_subscriber::fmt::init();

    let num_signers = 3;
    let num_attrs = 2;
    let mut rng = OsRng;

    let params = Params::generate(&mut rng, num_signers, num_attrs);
    let keys = keygen::keygen(&params, &mut rng);
    let (sks, pks) = split(&keys);

    let stores: Vec<_> = (0..num_signers).map(|_| RegistrationStore::new()).collect();
    let attrs: Vec<_> = (0..num_attrs).map(|_| group::random_scalar(&mut rng)).collect();
    let reg = registration::register(&params, &attrs, &stores, &mut rng).expect("registration should succeed");

    let mut opening = vec![reg.l0];
    opening.extend_from_slice(&attrs);

    let mut signers: Vec<Signer> = (0..num_signers)
        .map(|i| Signer::new(i, sks[i], pks[i], params.clone(), stores[i].clone()))
        .collect();

    let m = group::random_scalar(&mut rng);
    let (sigma, _show_secret) =
        sign::sign(&params, &pks, &mut signers, m, reg.c, &opening, &mut rng).expect("signing should succeed");

    let fixture = Fixture::from_session(&pks, m, &sigma);
    fixture.write_to("input.json").expect("failed to write input.json");

    tracing::info!(path = "input.json", "wrote fixture");
}
