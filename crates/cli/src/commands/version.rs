// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `nodeagent version` — prints embedded build metadata (design §6).

pub fn run() {
    println!("{}", build_string());
}

fn build_string() -> String {
    concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH")).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_string_embeds_the_package_version() {
        assert!(build_string().starts_with(env!("CARGO_PKG_VERSION")));
    }
}
