use cartesian::{Template, alt};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Generate an object template with `fields` choice points of random width,
/// a derived summary, and an `is` predicate dropping roughly half the
/// candidates.
pub fn generate_random_template(fields: usize) -> Template {
    let mut rng = StdRng::seed_from_u64(42); // Fixed seed for reproducibility
    let mut builder = Template::object();

    for i in 0..fields {
        let width = rng.random_range(2..5);
        let choices: Vec<Template> = (0..width)
            .map(|_| Template::from(random_string(&mut rng, 3, 8)))
            .collect();
        builder = builder.field(format!("field{}", i), alt(choices));
    }

    builder
        .derive("summary", |c| {
            Ok(c.iter()
                .filter_map(|(_, v)| v.as_str())
                .collect::<Vec<_>>()
                .join(" "))
        })
        .is(|c| Ok(c.str("field0")?.len() % 2 == 0))
        .build()
}

/// Generate a random string with length between min and max
fn random_string(rng: &mut StdRng, min_len: usize, max_len: usize) -> String {
    let charset = "abcdefghijklmnopqrstuvwxyz";
    let len = rng.random_range(min_len..=max_len);

    (0..len)
        .map(|_| {
            let idx = rng.random_range(0..charset.len());
            charset.chars().nth(idx).unwrap()
        })
        .collect()
}
