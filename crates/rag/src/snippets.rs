//! Curated per-OS command knowledge.
//!
//! Short, high-signal entries that teach the translation model which
//! commands exist on this OS. Each line is written to embed well: the
//! model places "check memory usage: vm_stat" near queries like "how much
//! RAM". The negative entries ("NEVER use free on macOS") matter as much
//! as the positive ones.

/// One curated snippet: (text, category).
pub type Snippet = (&'static str, &'static str);

const MACOS_SNIPPETS: &[Snippet] = &[
    // Memory / RAM
    ("check memory usage on macOS: use 'vm_stat' to see virtual memory page statistics", "memory"),
    ("how much total RAM on macOS: use 'sysctl hw.memsize' to get total physical memory in bytes", "memory"),
    ("quick memory overview on macOS: use 'top -l 1 -s 0 | head -n 10' for a snapshot of memory and CPU", "memory"),
    ("free RAM percentage on macOS: use 'memory_pressure' to check system memory pressure", "memory"),
    ("NEVER use 'free' or 'free -h' on macOS - it does not exist. Use vm_stat or sysctl hw.memsize instead", "memory"),
    // CPU
    ("check CPU info on macOS: use 'sysctl -n machdep.cpu.brand_string' for CPU model name", "cpu"),
    ("CPU core count on macOS: use 'sysctl -n hw.ncpu' for total cores", "cpu"),
    ("CPU usage on macOS: use 'top -l 1 -s 0 | head -n 10' for a quick CPU snapshot", "cpu"),
    ("NEVER use '/proc/cpuinfo' on macOS - it does not exist. Use sysctl instead", "cpu"),
    // Disk
    ("disk usage on macOS: use 'df -h' to show filesystem usage in human-readable format", "disk"),
    ("largest files on macOS: use 'du -sh * | sort -rh | head -10' to find biggest items in current directory", "disk"),
    ("disk space on macOS: use 'diskutil list' to show all disks and partitions", "disk"),
    // Network
    ("check if port is in use on macOS: use 'lsof -i :PORT' to see what's listening on a port", "network"),
    ("public IP address: use 'curl -s ifconfig.me' to get your public IP", "network"),
    ("local IP address on macOS: use 'ipconfig getifaddr en0' for WiFi IP", "network"),
    ("network connections on macOS: use 'netstat -an | grep LISTEN' to see listening ports", "network"),
    ("DNS lookup: use 'dig example.com' or 'nslookup example.com'", "network"),
    // Process management
    ("check if process is running on macOS: use 'pgrep -x PROCESS_NAME' or 'ps aux | grep PROCESS_NAME'", "process"),
    ("kill a process on macOS: use 'pkill PROCESS_NAME' or 'kill PID'", "process"),
    ("list all running processes: use 'ps aux' for detailed process list", "process"),
    ("find process using a port: use 'lsof -i :PORT' then 'kill PID'", "process"),
    // Package management
    ("install software on macOS: use 'brew install PACKAGE' (Homebrew)", "packages"),
    ("NEVER use 'apt', 'apt-get', or 'yum' on macOS - use 'brew' instead", "packages"),
    ("update packages on macOS: use 'brew update && brew upgrade'", "packages"),
    ("search for a package on macOS: use 'brew search KEYWORD'", "packages"),
    // Files and directories
    ("find files by name: use 'find . -name \"PATTERN\"' or 'find . -iname \"PATTERN\"' for case-insensitive", "files"),
    ("search file contents: use 'grep -r \"PATTERN\" .' to search recursively", "files"),
    ("file permissions: use 'chmod 755 FILE' to set permissions, 'ls -la' to view them", "files"),
    ("compress files on macOS: use 'tar -czf archive.tar.gz FILES' to create a gzip archive", "files"),
    ("extract archive: use 'tar -xzf archive.tar.gz' to extract a gzip archive", "files"),
    // Clipboard
    ("copy to clipboard on macOS: use 'pbcopy' (e.g. 'echo hello | pbcopy')", "clipboard"),
    ("paste from clipboard on macOS: use 'pbpaste'", "clipboard"),
    ("NEVER use 'xclip' or 'xsel' on macOS - use 'pbcopy'/'pbpaste' instead", "clipboard"),
    // System info
    ("macOS version: use 'sw_vers' to show macOS version info", "system"),
    ("system uptime: use 'uptime' to see how long the system has been running", "system"),
    ("open a file or URL on macOS: use 'open FILE' or 'open https://example.com'", "system"),
    ("NEVER use 'xdg-open' on macOS - use 'open' instead", "system"),
    // Git
    ("current git branch: use 'git branch --show-current'", "git"),
    ("git status: use 'git status' to see uncommitted changes", "git"),
    ("git log: use 'git log --oneline -10' for recent commits", "git"),
    ("stage and commit: use 'git add -A && git commit -m \"message\"'", "git"),
    ("undo last commit: use 'git reset --soft HEAD~1' to keep changes staged", "git"),
    // Docker
    ("list docker containers: use 'docker ps' for running, 'docker ps -a' for all", "docker"),
    ("stop docker container: use 'docker stop CONTAINER_ID'", "docker"),
    ("docker logs: use 'docker logs CONTAINER_ID' to view container output", "docker"),
];

const LINUX_SNIPPETS: &[Snippet] = &[
    ("check memory usage on Linux: use 'free -h' for human-readable memory info", "memory"),
    ("CPU info on Linux: use 'cat /proc/cpuinfo' or 'lscpu'", "cpu"),
    ("disk usage on Linux: use 'df -h' for filesystem usage", "disk"),
    ("install software on Linux: use 'apt install PACKAGE' (Debian/Ubuntu) or 'yum install PACKAGE' (RHEL/CentOS)", "packages"),
    ("open file on Linux: use 'xdg-open FILE'", "system"),
    ("clipboard on Linux: use 'xclip -selection clipboard' or 'xsel --clipboard'", "clipboard"),
];

/// Snippets for the given OS token. Both Rust's `macos` and the Go-style
/// `darwin` select the macOS list; every other token gets the Linux list.
pub fn for_os(os: &str) -> &'static [Snippet] {
    if matches!(os, "macos" | "darwin") {
        MACOS_SNIPPETS
    } else {
        LINUX_SNIPPETS
    }
}
