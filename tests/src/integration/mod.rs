#[cfg(test)]
mod flows;
