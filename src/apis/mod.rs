pub mod bandcamp;
pub mod beatport;
pub mod beatstats;
pub mod songstats;
pub mod soundcloud;
